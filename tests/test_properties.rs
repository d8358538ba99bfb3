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

use proptest::prelude::*;
use quadpave::{
    BoundaryInput, Capacity, PaveError, PaveParams, Paver, Point2, QuadMesh, Scratch, pave,
    rectangle_ring,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Checks what every run on these inputs must satisfy: success, the input
/// points first and unchanged, positive quads and Euler's relation.
fn check_mesh(input: &BoundaryInput, result: Result<QuadMesh, PaveError>) -> Result<(), TestCaseError> {
    let mesh = result.map_err(|e| TestCaseError::fail(format!("paving failed: {e}")))?;
    prop_assert_eq!(mesh.boundary_point_count(), input.points.len());
    for (p, q) in input.points.iter().zip(&mesh.points) {
        prop_assert_eq!(p, q);
    }
    for (i, quad) in mesh.quads.iter().enumerate() {
        prop_assert!(quad.iter().all(|&k| k < mesh.points.len()));
        let area = mesh.signed_area(i).unwrap_or(0.0);
        prop_assert!(area > 0.0, "quad {} has area {}", i, area);
    }
    let holes = input.loops.len() - 1;
    prop_assert_eq!(
        mesh.quad_count(),
        mesh.interior_point_count() + input.node_count() / 2 + holes - 1
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn rectangles_pave_consistently(
        nx in 1usize..=5,
        ny in 1usize..=5,
        edge in 0.1f64..10.0,
        stretch in 0.8f64..1.25,
        x0 in -50.0f64..50.0,
        y0 in -50.0f64..50.0,
    ) {
        let (w, h) = (edge * nx as f64, edge * stretch * ny as f64);
        let input = BoundaryInput::default().with_ring(rectangle_ring(x0, y0, w, h, nx, ny));
        let cap = Capacity::for_boundary(input.node_count());
        check_mesh(&input, pave(&input, &PaveParams::default(), cap))?;
    }

    #[test]
    fn clockwise_input_is_accepted(nx in 1usize..=4, ny in 1usize..=4) {
        let mut ring = rectangle_ring(0.0, 0.0, nx as f64, ny as f64, nx, ny);
        ring.reverse();
        let input = BoundaryInput::default().with_ring(ring);
        let cap = Capacity::for_boundary(input.node_count());
        check_mesh(&input, pave(&input, &PaveParams::default(), cap))?;
    }
}

fn jittered_square(rng: &mut StdRng, n: usize) -> BoundaryInput {
    let ring = rectangle_ring(0.0, 0.0, n as f64, n as f64, n, n);
    let moved: Vec<Point2<f64>> = ring
        .into_iter()
        .map(|p| {
            let on_x_side = p.y == 0.0 || p.y == n as f64;
            let on_y_side = p.x == 0.0 || p.x == n as f64;
            // corners stay put, side nodes slide along their side
            match (on_x_side, on_y_side) {
                (true, false) => Point2::new(p.x + rng.random_range(-0.2..0.2), p.y),
                (false, true) => Point2::new(p.x, p.y + rng.random_range(-0.2..0.2)),
                _ => p,
            }
        })
        .collect();
    BoundaryInput::default().with_ring(moved)
}

#[test]
fn jittered_boundaries_pave_consistently() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..24 {
        let n = rng.random_range(2..=5);
        let input = jittered_square(&mut rng, n);
        let cap = Capacity::for_boundary(input.node_count());
        check_mesh(&input, pave(&input, &PaveParams::default(), cap)).unwrap();
    }
}

#[test]
fn paving_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let input = jittered_square(&mut rng, 4);
    let cap = Capacity::for_boundary(input.node_count());
    let params = PaveParams::default();
    let a = pave(&input, &params, cap).unwrap();
    let b = pave(&input, &params, cap).unwrap();
    assert_eq!(a.quads, b.quads);
    assert_eq!(a.points, b.points);
    assert_eq!(a.stats, b.stats);
}

fn check_front(paver: &Paver<'_>, step: usize) {
    paver.store().validate().unwrap();
    for lp in paver.front().active_loops() {
        let len = paver.front().loop_nodes(lp).unwrap().len();
        assert_eq!(len % 2, 0, "loop {lp} has {len} nodes after step {step}");
    }
}

/// Steps `input` to completion, checking the store and the parity of every
/// open loop before the first step and after each one.
fn pave_stepwise(input: &BoundaryInput) -> QuadMesh {
    let params = PaveParams::default();
    let mut paver = Paver::new(input, &params, Capacity::for_boundary(input.node_count())).unwrap();
    let mut scratch = Scratch::new();
    check_front(&paver, 0);
    let mut steps = 0;
    while paver.step(&mut scratch).unwrap() {
        steps += 1;
        check_front(&paver, steps);
    }
    assert_eq!(steps, paver.stats().iterations);
    paver.finish().unwrap()
}

#[test]
fn every_step_keeps_loops_even_and_the_store_valid() {
    let annulus = BoundaryInput::default()
        .with_ring(rectangle_ring(0.0, 0.0, 3.0, 3.0, 3, 3))
        .with_ring(rectangle_ring(1.0, 1.0, 1.0, 1.0, 1, 1));
    let strip = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 3.0, 1.0, 3, 1));
    let mut inputs = vec![annulus, strip];
    let mut rng = StdRng::seed_from_u64(0xb10b);
    for n in 2..=5 {
        inputs.push(jittered_square(&mut rng, n));
    }
    for input in &inputs {
        let mesh = pave_stepwise(input);
        check_mesh(input, Ok(mesh)).unwrap();
    }
}
