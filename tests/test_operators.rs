// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use quadpave::{
    BoundaryInput, Capacity, Front, FrontStore, NodeId, PaveParams, Paver, Point2, Scratch,
    mesh::Node,
    paving::{NodeKind, PinchReject},
    rectangle_ring,
};

fn add_nodes(store: &mut FrontStore, points: &[(f64, f64)]) -> Vec<NodeId> {
    points
        .iter()
        .map(|&(x, y)| store.add_node(Node::new(Point2::new(x, y), 1.0)).unwrap())
        .collect()
}

fn add_loop(store: &mut FrontStore, front: &mut Front, ids: &[NodeId]) {
    for k in 0..ids.len() {
        store.add_line(ids[k], ids[(k + 1) % ids.len()]).unwrap();
    }
    front.add_loop(ids, false, 0).unwrap();
}

fn node_at(paver: &Paver<'_>, x: f64, y: f64) -> NodeId {
    paver
        .store()
        .nodes()
        .find(|(_, n)| n.position.distance_to(&Point2::new(x, y)) < 1e-9)
        .map(|(id, _)| id)
        .unwrap()
}

#[test]
fn square_corners_are_end_nodes() {
    let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 4.0, 4.0, 4, 4));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(16)).unwrap();
    paver.classify_loop(0, &mut Scratch::new()).unwrap();

    let corner = node_at(&paver, 0.0, 0.0);
    let side = node_at(&paver, 2.0, 0.0);
    assert_eq!(paver.front().record(corner).unwrap().kind, NodeKind::End);
    assert_eq!(paver.front().record(side).unwrap().kind, NodeKind::Side);
    let ends = paver
        .front()
        .loop_nodes(0)
        .unwrap()
        .into_iter()
        .filter(|n| paver.front().record(*n).unwrap().kind == NodeKind::End)
        .count();
    assert_eq!(ends, 4);
}

#[test]
fn reflex_corner_of_an_l_is_a_corner_node() {
    let input = BoundaryInput::from_coords(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
        (0.0, 1.0),
    ])
    .with_loop((0..8).collect());
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(8)).unwrap();
    paver.classify_loop(0, &mut Scratch::new()).unwrap();

    let reflex = node_at(&paver, 1.0, 1.0);
    let rec = paver.front().record(reflex).unwrap();
    assert_eq!(rec.kind, NodeKind::Corner);
    assert!((rec.angle - 1.5 * std::f64::consts::PI).abs() < 1e-9);
    assert_eq!(paver.front().record(node_at(&paver, 1.0, 0.0)).unwrap().kind, NodeKind::Side);
}

#[test]
fn pinch_folds_a_sharp_apex() {
    let mut store = FrontStore::new(Capacity::new(32, 64, 16));
    let mut front = Front::new();
    // n, q, s1, s2, s5, s3, s4, p
    let ring = add_nodes(
        &mut store,
        &[
            (0.0, 0.0),
            (2.0, -0.09),
            (4.0, -2.0),
            (6.0, -2.0),
            (6.0, 0.0),
            (6.0, 2.0),
            (4.0, 2.0),
            (2.0, 0.09),
        ],
    );
    add_loop(&mut store, &mut front, &ring);
    let (n, q, p) = (ring[0], ring[1], ring[7]);
    let below = add_nodes(&mut store, &[(0.0, -1.5), (2.0, -1.5)]);
    let above = add_nodes(&mut store, &[(0.0, 1.5), (2.0, 1.5)]);
    store.link_quad([n, below[0], below[1], q]).unwrap();
    store.link_quad([n, p, above[1], above[0]]).unwrap();

    let params = PaveParams::default();
    let mut paver = Paver::from_parts(store, front, &params).unwrap();
    let pinched = paver.pinch_loop(0, &mut Scratch::new()).unwrap();

    assert_eq!(pinched, 1);
    assert_eq!(paver.stats().pinches, 1);
    assert_eq!(paver.front().loop_nodes(0).unwrap().len(), 6);
    assert_eq!(paver.store().counts().0, 11);
    assert!(!paver.store().contains_node(q));
    assert!(!paver.front().contains(n));

    let kept = paver.store().position(p).unwrap();
    assert!(kept.distance_to(&Point2::new(2.0, 0.0)) < 1e-9);
    assert_eq!(paver.front().prev(p).unwrap(), ring[6]);
    assert_eq!(paver.front().next(p).unwrap(), ring[2]);
    assert_eq!(paver.store().line_quad_count(n, p), Some(2));
    paver.store().validate().unwrap();
}

#[test]
fn pinch_refuses_boundary_apex() {
    let input = BoundaryInput::from_coords(&[
        (0.0, 0.0),
        (3.0, -0.1),
        (4.0, -1.0),
        (5.0, 0.0),
        (4.0, 1.0),
        (3.0, 0.1),
    ])
    .with_loop((0..6).collect());
    let params = PaveParams::default();
    let paver = Paver::new(&input, &params, Capacity::for_boundary(6)).unwrap();
    let apex = node_at(&paver, 0.0, 0.0);
    let mut edges = Vec::new();
    paver.front().edges(paver.store(), &mut edges).unwrap();

    let outcome = paver.pinch_begin(apex, &edges).unwrap();
    assert!(matches!(outcome, Err(PinchReject::BoundaryLines)));
}

#[test]
fn wedge_widens_an_uneven_node() {
    let mut store = FrontStore::new(Capacity::new(32, 64, 16));
    let mut front = Front::new();
    let ids = add_nodes(
        &mut store,
        &[(-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (4.0, 0.0), (4.0, 3.0), (-1.0, 3.0)],
    );
    add_loop(&mut store, &mut front, &ids);
    let (p, n, q) = (ids[1], ids[2], ids[3]);

    let params = PaveParams::default();
    let mut paver = Paver::from_parts(store, front, &params).unwrap();
    let mut scratch = Scratch::new();
    assert!(paver.insert_wedge(n, &mut scratch).unwrap());

    assert_eq!(paver.stats().wedges, 1);
    assert_eq!(paver.store().counts(), (9, 11, 2));
    assert_eq!(paver.front().loop_nodes(0).unwrap().len(), 8);
    assert!(!paver.front().contains(n));

    let x = paver.front().next(p).unwrap();
    let apex = paver.front().next(x).unwrap();
    let b = paver.front().next(apex).unwrap();
    assert_eq!(paver.front().next(b).unwrap(), q);
    for (id, (ex, ey)) in [(x, (0.0, 1.0)), (apex, (1.0, 1.0)), (b, (2.5, 1.0))] {
        let at = paver.store().position(id).unwrap();
        assert!(at.distance_to(&Point2::new(ex, ey)) < 1e-9, "{id} at {at:?}");
    }
    assert_eq!(paver.front().record(apex).unwrap().row, 1);

    // p now has two unit edges
    assert!(!paver.insert_wedge(p, &mut scratch).unwrap());
    paver.store().validate().unwrap();
}

#[test]
fn bridge_operators_leave_a_plain_square_alone() {
    let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 4.0, 4.0, 4, 4));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(16)).unwrap();
    let mut scratch = Scratch::new();
    let before = paver.store().counts();

    assert!(!paver.collapse_loop(0, &mut scratch).unwrap());
    assert!(!paver.merge_loops(0, &mut scratch).unwrap());
    assert_eq!(paver.store().counts(), before);
    assert_eq!(paver.front().loop_nodes(0).unwrap().len(), 16);
    assert_eq!(paver.stats().collapses + paver.stats().merges, 0);
}

#[test]
fn closing_a_four_node_loop_adds_one_quad() {
    let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 1.0, 1.0, 1, 1));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(4)).unwrap();

    assert!(paver.close_small_loop(0, &mut Scratch::new()).unwrap());
    assert!(paver.is_done());
    assert_eq!(paver.store().counts(), (4, 4, 1));
    let mesh = paver.finish().unwrap();
    assert_eq!(mesh.quads.len(), 1);
    assert!(mesh.signed_area(0).unwrap() > 0.0);
}

#[test]
fn six_node_loop_closes_with_two_quads() {
    let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 2.0, 1.0, 2, 1));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(6)).unwrap();

    assert!(paver.close_small_loop(0, &mut Scratch::new()).unwrap());
    assert_eq!(paver.store().counts().2, 2);
    assert_eq!(paver.store().line_quad_count(node_at(&paver, 1.0, 0.0), node_at(&paver, 1.0, 1.0)), Some(2));
    assert_eq!(paver.stats().closures, 1);
}

fn circle(r: f64, n: usize) -> Vec<Point2<f64>> {
    (0..n)
        .map(|k| {
            let t = k as f64 / n as f64 * std::f64::consts::TAU;
            Point2::new(r * t.cos(), r * t.sin())
        })
        .collect()
}

#[test]
fn ring_row_grows_a_round_hole() {
    let input = BoundaryInput::default()
        .with_ring(circle(3.0, 24))
        .with_ring(circle(1.0, 8));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(32)).unwrap();
    let mut scratch = Scratch::new();

    assert!(!paver.advance_ring_row(0, &mut scratch).unwrap());
    assert!(paver.advance_ring_row(1, &mut scratch).unwrap());
    assert_eq!(paver.store().counts(), (40, 48, 8));
    assert_eq!(paver.stats().circular_rows, 1);

    let hole = paver.front().loop_nodes(1).unwrap();
    assert_eq!(hole.len(), 8);
    let radius = 2.0 * std::f64::consts::SQRT_2 - 1.0;
    for n in hole {
        let p = paver.store().position(n).unwrap();
        assert!((p.distance_to(&Point2::origin()) - radius).abs() < 1e-9);
        assert_eq!(paver.front().record(n).unwrap().row, 1);
    }
    assert!(paver.front().signed_area(1, paver.store()).unwrap() < 0.0);
    paver.store().validate().unwrap();
}

#[test]
fn fan_closes_a_star_shaped_loop() {
    let input = BoundaryInput::default().with_ring(circle(1.0, 8));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(8)).unwrap();

    assert!(paver.close_with_fan(0, &mut Scratch::new()).unwrap());
    assert!(paver.is_done());
    assert_eq!(paver.store().counts(), (9, 12, 4));
    paver.store().validate().unwrap();

    let mesh = paver.finish().unwrap();
    assert_eq!(mesh.quad_count(), 4);
    assert!(mesh.points[8].distance_to(&Point2::origin()) < 1e-9);
    for q in 0..4 {
        assert!(mesh.signed_area(q).unwrap() > 0.0);
    }
}

#[test]
fn fan_refuses_a_hole() {
    let input = BoundaryInput::default()
        .with_ring(circle(3.0, 24))
        .with_ring(circle(1.0, 8));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(32)).unwrap();
    let mut scratch = Scratch::new();

    assert!(!paver.close_with_fan(1, &mut scratch).unwrap());
    // the hole lies inside every fan around the outer loop
    assert!(!paver.close_with_fan(0, &mut scratch).unwrap());
    assert_eq!(paver.store().counts().2, 0);
}

#[test]
fn ear_cut_shrinks_a_loop_by_two() {
    let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 2.0, 1.0, 2, 1));
    let params = PaveParams::default();
    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(6)).unwrap();
    let mut scratch = Scratch::new();

    assert!(paver.cut_ear(0, &mut scratch).unwrap());
    assert_eq!(paver.front().loop_nodes(0).unwrap().len(), 4);
    assert_eq!(paver.store().counts(), (6, 7, 1));
    let area = paver.front().signed_area(0, paver.store()).unwrap();
    assert!((area - 1.0).abs() < 1e-12);
    paver.store().validate().unwrap();

    assert!(!paver.cut_ear(0, &mut scratch).unwrap());
    assert!(paver.close_small_loop(0, &mut scratch).unwrap());
    assert!(paver.is_done());
    let mesh = paver.finish().unwrap();
    assert_eq!(mesh.quad_count(), 2);
    assert_eq!(mesh.interior_point_count(), 0);
}
