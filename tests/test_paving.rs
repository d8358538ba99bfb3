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

use approx::assert_relative_eq;
use quadpave::{
    BoundaryInput, Capacity, PaveError, PaveParams, Paver, Point2, QuadMesh, Scratch, SizeHint,
    Table, geometry::util::polygon_signed_area, pave, rectangle_ring,
};

fn square(nx: usize, ny: usize) -> BoundaryInput {
    BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, nx as f64, ny as f64, nx, ny))
}

fn region_area(input: &BoundaryInput) -> f64 {
    input
        .loops
        .iter()
        .enumerate()
        .map(|(i, lp)| {
            let ring: Vec<Point2<f64>> = lp.iter().map(|&k| input.points[k]).collect();
            let a = polygon_signed_area(&ring).abs();
            if i == 0 { a } else { -a }
        })
        .sum()
}

fn check_mesh(input: &BoundaryInput, mesh: &QuadMesh) {
    for q in 0..mesh.quad_count() {
        let a = mesh.signed_area(q).unwrap();
        assert!(a > 0.0, "quad {q} has signed area {a}");
    }
    assert_eq!(mesh.boundary_point_count(), input.points.len());
    for (p, q) in input.points.iter().zip(&mesh.points) {
        assert_eq!(p, q);
    }
    let boundary = input.node_count();
    let holes = input.loops.len() - 1;
    assert_eq!(
        mesh.quad_count(),
        mesh.interior_point_count() + boundary / 2 + holes - 1
    );
    assert_relative_eq!(mesh.total_area(), region_area(input), max_relative = 1e-9);
}

/// Quads rotated to start at their smallest point index, then sorted.
fn canonical_quads(mesh: &QuadMesh) -> Vec<[usize; 4]> {
    let mut quads: Vec<[usize; 4]> = mesh
        .quads
        .iter()
        .map(|q| {
            let k = (0..4).min_by_key(|&i| q[i]).unwrap();
            [q[k], q[(k + 1) % 4], q[(k + 2) % 4], q[(k + 3) % 4]]
        })
        .collect();
    quads.sort();
    quads
}

fn circle(r: f64, n: usize) -> Vec<Point2<f64>> {
    (0..n)
        .map(|k| {
            let t = k as f64 / n as f64 * std::f64::consts::TAU;
            Point2::new(r * t.cos(), r * t.sin())
        })
        .collect()
}

/// `per_side` nodes on each side of the polygon through `corners`.
fn polygon_ring(corners: &[(f64, f64)], per_side: usize) -> Vec<Point2<f64>> {
    let mut ring = Vec::with_capacity(corners.len() * per_side);
    for (i, &(ax, ay)) in corners.iter().enumerate() {
        let (bx, by) = corners[(i + 1) % corners.len()];
        for k in 0..per_side {
            let t = k as f64 / per_side as f64;
            ring.push(Point2::new(ax + t * (bx - ax), ay + t * (by - ay)));
        }
    }
    ring
}

#[test]
fn two_by_two_square_gets_four_quads() {
    let input = square(2, 2);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(8)).unwrap();

    assert_eq!(mesh.quad_count(), 4);
    assert_eq!(mesh.interior_point_count(), 1);
    let centre = mesh.points[8];
    assert_relative_eq!(centre.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(centre.y, 1.0, epsilon = 1e-9);
    assert_eq!(
        canonical_quads(&mesh),
        vec![[0, 1, 8, 7], [1, 2, 3, 8], [3, 4, 5, 8], [5, 6, 7, 8]]
    );
    check_mesh(&input, &mesh);
}

#[test]
fn four_by_four_square_is_a_grid() {
    let input = square(4, 4);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(16)).unwrap();

    assert_eq!(mesh.quad_count(), 16);
    assert_eq!(mesh.interior_point_count(), 9);
    assert!(mesh.stats.rows >= 1);
    check_mesh(&input, &mesh);
}

#[test]
fn strip_collapses_into_a_single_row() {
    let input = square(3, 1);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(8)).unwrap();

    assert_eq!(mesh.quad_count(), 3);
    assert_eq!(mesh.interior_point_count(), 0);
    assert_eq!(mesh.stats.collapses, 1);
    check_mesh(&input, &mesh);
}

#[test]
fn annulus_merges_its_hole() {
    let input = BoundaryInput::default()
        .with_ring(rectangle_ring(0.0, 0.0, 3.0, 3.0, 3, 3))
        .with_ring(rectangle_ring(1.0, 1.0, 1.0, 1.0, 1, 1));
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(16)).unwrap();

    assert!(mesh.stats.merges >= 1);
    assert!(mesh.quad_count() >= 8);
    check_mesh(&input, &mesh);
}

#[test]
fn hole_given_counter_clockwise_is_turned_around() {
    let mut hole = rectangle_ring(1.0, 1.0, 1.0, 1.0, 1, 1);
    hole.reverse();
    let input = BoundaryInput::default()
        .with_ring(rectangle_ring(0.0, 0.0, 3.0, 3.0, 3, 3))
        .with_ring(hole);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(16)).unwrap();
    check_mesh(&input, &mesh);
}

#[test]
fn equilateral_triangle_is_paved() {
    let h = 2.0 * 3f64.sqrt();
    let input = BoundaryInput::default().with_ring(polygon_ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, h)], 4));
    assert_eq!(input.node_count(), 12);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(12)).unwrap();
    check_mesh(&input, &mesh);
}

#[test]
fn graded_rectangle_is_paved() {
    let mut coords: Vec<(f64, f64)> = (0..8).map(|i| (0.5 * i as f64, 0.0)).collect();
    coords.extend([(4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (0.0, 2.0)]);
    let input = BoundaryInput::from_coords(&coords).with_loop((0..12).collect());
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(12)).unwrap();
    check_mesh(&input, &mesh);
}

#[test]
fn round_hole_grows_until_it_merges() {
    let input = BoundaryInput::default()
        .with_ring(circle(3.0, 24))
        .with_ring(circle(1.0, 8));
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(32)).unwrap();

    assert!(mesh.stats.merges >= 1);
    check_mesh(&input, &mesh);
}

#[test]
fn two_node_loop_closes_without_quads() {
    let input = BoundaryInput::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).with_loop(vec![0, 1]);
    let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(2)).unwrap();

    assert_eq!(mesh.quad_count(), 0);
    assert_eq!(mesh.points.len(), 2);
    assert_eq!(mesh.stats.closures, 1);
}

#[test]
fn uniform_size_hint_matches_auto_on_a_regular_square() {
    let auto = pave(&square(2, 2), &PaveParams::default(), Capacity::for_boundary(8)).unwrap();
    let sized = square(2, 2).with_sizes(SizeHint::Uniform(1.0));
    let uniform = pave(&sized, &PaveParams::default(), Capacity::for_boundary(8)).unwrap();

    assert_eq!(auto.quads, uniform.quads);
    assert_eq!(auto.points.len(), uniform.points.len());
}

#[test]
fn degenerate_inputs_are_rejected() {
    let params = PaveParams::default();
    let cap = Capacity::for_boundary(8);

    let empty = BoundaryInput::default();
    assert!(matches!(pave(&empty, &params, cap), Err(PaveError::DegenerateInput(_))));

    let odd = BoundaryInput::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])
        .with_loop(vec![0, 1, 2]);
    assert!(matches!(pave(&odd, &params, cap), Err(PaveError::DegenerateInput(_))));

    let missing = BoundaryInput::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).with_loop(vec![0, 5]);
    assert!(matches!(pave(&missing, &params, cap), Err(PaveError::DegenerateInput(_))));

    let nan = BoundaryInput::from_coords(&[(0.0, 0.0), (f64::NAN, 0.0)]).with_loop(vec![0, 1]);
    assert!(matches!(pave(&nan, &params, cap), Err(PaveError::DegenerateInput(_))));

    let sizes = square(2, 2).with_sizes(SizeHint::PerNode(vec![1.0; 3]));
    assert!(matches!(pave(&sizes, &params, cap), Err(PaveError::DegenerateInput(_))));
}

#[test]
fn non_positive_size_is_a_geometry_error() {
    let input = square(2, 2).with_sizes(SizeHint::Uniform(0.0));
    let result = pave(&input, &PaveParams::default(), Capacity::for_boundary(8));
    assert!(matches!(result, Err(PaveError::Geometry { .. })));
}

#[test]
fn invalid_params_are_rejected() {
    let params = PaveParams::default().with_element_angles(2.0, 1.0);
    let result = pave(&square(2, 2), &params, Capacity::for_boundary(8));
    assert!(result.is_err());
}

#[test]
fn full_node_table_reports_capacity() {
    let result = pave(&square(2, 2), &PaveParams::default(), Capacity::new(8, 64, 16));
    match result {
        Err(PaveError::CapacityExceeded { table, capacity }) => {
            assert_eq!(table, Table::Nodes);
            assert_eq!(capacity, 8);
        }
        other => panic!("expected a capacity error, got {other:?}"),
    }
}

#[test]
fn boundary_larger_than_capacity_fails_before_paving() {
    let result = pave(&square(4, 4), &PaveParams::default(), Capacity::new(8, 64, 64));
    assert!(matches!(result, Err(e) if e.is_capacity()));
}

#[test]
fn iteration_limit_is_a_geometry_error() {
    let params = PaveParams::default().with_max_iterations(1);
    let result = pave(&square(4, 4), &params, Capacity::for_boundary(16));
    assert!(matches!(result, Err(PaveError::Geometry { loop_id: Some(0), .. })));
}

#[test]
fn stepping_matches_a_full_run() {
    let input = square(4, 4);
    let params = PaveParams::default();
    let whole = pave(&input, &params, Capacity::for_boundary(16)).unwrap();

    let mut paver = Paver::new(&input, &params, Capacity::for_boundary(16)).unwrap();
    let mut scratch = Scratch::new();
    let mut steps = 0;
    while paver.step(&mut scratch).unwrap() {
        steps += 1;
    }
    assert!(paver.is_done());
    assert_eq!(steps, whole.stats.iterations);
    assert!(!paver.step(&mut scratch).unwrap());

    let stepped = paver.finish().unwrap();
    assert_eq!(stepped.quads, whole.quads);
    assert_eq!(stepped.stats, whole.stats);
}

#[test]
fn finishing_an_open_front_fails() {
    let params = PaveParams::default();
    let paver = Paver::new(&square(2, 2), &params, Capacity::for_boundary(8)).unwrap();
    assert!(!paver.is_done());
    assert!(matches!(paver.finish(), Err(PaveError::Geometry { loop_id: Some(0), .. })));
}
