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

use std::f64::consts::TAU;

use num_traits::FloatConst;

use crate::{geometry::Point2, numeric::Scalar};

/// Interior angle at `node` of a front traversed `prev -> node -> next` with the
/// unmeshed region on its left. Measured counter-clockwise from the direction of
/// `next` to the direction of `prev`, in `[0, 2π)`.
///
/// Returns `None` when either neighbor coincides with `node`.
pub fn interior_angle<T: Scalar + FloatConst>(
    prev: &Point2<T>,
    node: &Point2<T>,
    next: &Point2<T>,
) -> Option<T> {
    let a = *next - *node;
    let b = *prev - *node;
    if a.norm2() <= T::epsilon() || b.norm2() <= T::epsilon() {
        return None;
    }
    let mut theta = a.cross(&b).atan2(a.dot(&b));
    if theta < T::zero() {
        theta = theta + T::TAU();
    }
    Some(theta)
}

/// Shoelace area, positive for counter-clockwise rings.
pub fn polygon_signed_area<T: Scalar>(ring: &[Point2<T>]) -> T {
    if ring.len() < 3 {
        return T::zero();
    }
    let mut acc = T::zero();
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        acc = acc + (p.x * q.y - q.x * p.y);
    }
    acc * T::from_num_den(1, 2)
}

/// Area centroid of a simple ring; `None` when the ring encloses no area.
pub fn polygon_centroid<T: Scalar>(ring: &[Point2<T>]) -> Option<Point2<T>> {
    let area = polygon_signed_area(ring);
    if area.abs() <= T::epsilon() {
        return None;
    }
    let (mut cx, mut cy) = (T::zero(), T::zero());
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        let w = p.x * q.y - q.x * p.y;
        cx = cx + (p.x + q.x) * w;
        cy = cy + (p.y + q.y) * w;
    }
    let six = area * T::from_num_den(6, 1);
    Some(Point2::new(cx / six, cy / six))
}

/// Turning accumulated along a closed ring (≈ 2π counter-clockwise, -2π clockwise).
pub fn total_turning(angles: &[f64]) -> f64 {
    angles.iter().map(|theta| std::f64::consts::PI - theta).sum()
}

pub fn quad_signed_area<T: Scalar>(q: &[Point2<T>; 4]) -> T {
    polygon_signed_area(q)
}

/// Cross product of the outgoing and incoming edge at each corner; all positive
/// for a strictly convex counter-clockwise quad.
pub fn quad_corner_crosses<T: Scalar>(q: &[Point2<T>; 4]) -> [T; 4] {
    let mut out = [T::zero(); 4];
    for i in 0..4 {
        let cur = q[i];
        let next = q[(i + 1) % 4];
        let prev = q[(i + 3) % 4];
        out[i] = (next - cur).cross(&(prev - cur));
    }
    out
}

pub fn quad_is_convex<T: Scalar>(q: &[Point2<T>; 4]) -> bool {
    let scale = quad_max_edge2(q);
    if scale <= T::epsilon() {
        return false;
    }
    let eps = scale * T::tolerance();
    quad_corner_crosses(q).iter().all(|c| *c > eps)
}

pub fn quad_max_edge2<T: Scalar>(q: &[Point2<T>; 4]) -> T {
    (0..4)
        .map(|i| q[i].distance2_to(&q[(i + 1) % 4]))
        .fold(T::zero(), |acc, l| acc.max(l))
}

/// Corner angles in radians, in quad order. Degenerate corners report 0.
pub fn quad_angles(q: &[Point2<f64>; 4]) -> [f64; 4] {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = interior_angle(&q[(i + 3) % 4], &q[i], &q[(i + 1) % 4]).unwrap_or(0.0);
    }
    out
}

/// `(min, max)` corner angle of a quad.
pub fn quad_angle_range(q: &[Point2<f64>; 4]) -> (f64, f64) {
    quad_angles(q)
        .iter()
        .fold((TAU, 0.0), |(lo, hi), a| (lo.min(*a), hi.max(*a)))
}

/// Strictly convex with every corner angle inside `[min_angle, max_angle]`.
pub fn quad_is_acceptable(q: &[Point2<f64>; 4], min_angle: f64, max_angle: f64) -> bool {
    if !q.iter().all(Point2::is_finite) || !quad_is_convex(q) {
        return false;
    }
    let (lo, hi) = quad_angle_range(q);
    lo >= min_angle && hi <= max_angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn square() -> [Point2<f64>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn interior_angle_of_convex_and_reflex_corners() {
        let o = Point2::new(0.0, 0.0);
        let right = Point2::new(1.0, 0.0);
        let up = Point2::new(0.0, 1.0);
        let theta = interior_angle(&up, &o, &right).unwrap();
        assert!((theta - FRAC_PI_2).abs() < 1e-12);
        let reflex = interior_angle(&right, &o, &up).unwrap();
        assert!((reflex - 3.0 * FRAC_PI_2).abs() < 1e-12);
        let straight = interior_angle(&Point2::new(-1.0, 0.0), &o, &right).unwrap();
        assert!((straight - PI).abs() < 1e-12);
        assert!(interior_angle(&o, &o, &right).is_none());
    }

    #[test]
    fn square_quad_is_acceptable() {
        let q = square();
        assert!((quad_signed_area(&q) - 1.0).abs() < 1e-12);
        assert!(quad_is_convex(&q));
        assert!(quad_is_acceptable(&q, 0.2, 3.0));
        let mut flipped = q;
        flipped.reverse();
        assert!(!quad_is_convex(&flipped));
    }

    #[test]
    fn centroid_of_an_l_shape() {
        let l = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let c: Point2<f64> = polygon_centroid(&l).unwrap();
        assert!((c.x - 5.0 / 6.0).abs() < 1e-12);
        assert!((c.y - 5.0 / 6.0).abs() < 1e-12);
        let flat: [Point2<f64>; 3] = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(polygon_centroid(&flat).is_none());
    }

    #[test]
    fn collinear_corner_is_not_convex() {
        let q = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(!quad_is_convex(&q));
    }
}
