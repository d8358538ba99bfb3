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

use crate::geometry::{Point2, Segment2};
use crate::kernel::orientation::{Orientation, orient2d_sign};

pub fn are_equal(p1: &Point2<f64>, p2: &Point2<f64>, eps: f64) -> bool {
    (p1.x - p2.x).abs() < eps && (p1.y - p2.y).abs() < eps
}

/// `p` lies on `seg`, endpoints included. Assumes `p` is already known to be
/// collinear with the segment.
fn within_bounds(p: &Point2<f64>, seg: &Segment2<f64>) -> bool {
    let (lo, hi) = seg.bounds();
    p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
}

pub fn is_point_on_segment(p: &Point2<f64>, seg: &Segment2<f64>) -> bool {
    orient2d_sign(&seg.a, &seg.b, p) == Orientation::Collinear && within_bounds(p, seg)
}

/// Closed segment intersection: touching endpoints and collinear overlap count.
pub fn segments_intersect(s: &Segment2<f64>, t: &Segment2<f64>) -> bool {
    if !s.bounds_overlap(t, 0.0) {
        return false;
    }
    let o1 = orient2d_sign(&s.a, &s.b, &t.a).as_i8();
    let o2 = orient2d_sign(&s.a, &s.b, &t.b).as_i8();
    let o3 = orient2d_sign(&t.a, &t.b, &s.a).as_i8();
    let o4 = orient2d_sign(&t.a, &t.b, &s.b).as_i8();

    if o1 * o2 < 0 && o3 * o4 < 0 {
        return true;
    }

    (o1 == 0 && within_bounds(&t.a, s))
        || (o2 == 0 && within_bounds(&t.b, s))
        || (o3 == 0 && within_bounds(&s.a, t))
        || (o4 == 0 && within_bounds(&s.b, t))
}

/// Intersecting, or passing closer than `tol` to each other.
pub fn segments_conflict(s: &Segment2<f64>, t: &Segment2<f64>, tol: f64) -> bool {
    if !s.bounds_overlap(t, tol) {
        return false;
    }
    if segments_intersect(s, t) {
        return true;
    }
    s.distance_to_point(&t.a) < tol
        || s.distance_to_point(&t.b) < tol
        || t.distance_to_point(&s.a) < tol
        || t.distance_to_point(&s.b) < tol
}

/// `p` strictly inside the counter-clockwise convex polygon `ring`.
pub fn point_in_convex(p: &Point2<f64>, ring: &[Point2<f64>]) -> bool {
    (0..ring.len()).all(|i| {
        orient2d_sign(&ring[i], &ring[(i + 1) % ring.len()], p) == Orientation::CounterClockwise
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment2<f64> {
        Segment2::new(Point2::new(ax, ay), Point2::new(bx, by))
    }

    #[test]
    fn crossing_and_disjoint_segments() {
        assert!(segments_intersect(&seg(0.0, 0.0, 2.0, 2.0), &seg(0.0, 2.0, 2.0, 0.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn touching_counts_as_crossing() {
        assert!(segments_intersect(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, 0.0, 1.0, 1.0)));
        assert!(segments_intersect(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, 0.0, 3.0, 0.0)));
        assert!(!segments_intersect(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 3.0, 0.0)));
    }

    #[test]
    fn near_miss_conflicts_under_tolerance() {
        let s = seg(0.0, 0.0, 2.0, 0.0);
        let t = seg(1.0, 1e-6, 1.0, 1.0);
        assert!(!segments_intersect(&s, &t));
        assert!(segments_conflict(&s, &t, 1e-4));
        assert!(!segments_conflict(&s, &t, 1e-8));
    }

    #[test]
    fn point_on_segment_and_in_quad() {
        assert!(is_point_on_segment(&Point2::new(1.0, 1.0), &seg(0.0, 0.0, 2.0, 2.0)));
        assert!(!is_point_on_segment(&Point2::new(3.0, 3.0), &seg(0.0, 0.0, 2.0, 2.0)));
        let ring = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(point_in_convex(&Point2::new(0.5, 0.5), &ring));
        assert!(!point_in_convex(&Point2::new(1.0, 0.5), &ring));
        assert!(are_equal(&ring[0], &Point2::new(1e-12, 0.0), 1e-9));
    }
}
