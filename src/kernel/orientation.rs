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

use crate::geometry::Point2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

impl Orientation {
    pub fn as_i8(self) -> i8 {
        match self {
            Orientation::CounterClockwise => 1,
            Orientation::Clockwise => -1,
            Orientation::Collinear => 0,
        }
    }
}

// (3 + 16ε)ε, the static error bound of the two-product determinant.
const CCW_ERR_BOUND: f64 = (3.0 + 16.0 * f64::EPSILON) * f64::EPSILON;

/// Returns:
/// - >0 if counter-clockwise
/// - <0 if clockwise
/// - =0 if collinear
///
/// Plain floating point; see [`orient2d_sign`] for the filtered predicate.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Filtered orientation. When the float determinant is too close to zero to
/// trust, the sign is recomputed exactly (feature `exact`) or reported as
/// collinear.
pub fn orient2d_sign(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Orientation {
    let left = (a.x - c.x) * (b.y - c.y);
    let right = (a.y - c.y) * (b.x - c.x);
    let det = left - right;
    let sum = left.abs() + right.abs();

    if det.abs() > CCW_ERR_BOUND * sum {
        return classify(det);
    }
    exact_sign(a, b, c)
}

fn classify(det: f64) -> Orientation {
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

#[cfg(feature = "exact")]
fn exact_sign(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Orientation {
    use rug::Rational;

    let to_q = |v: f64| Rational::from_f64(v).unwrap_or_default();
    let (ax, ay) = (to_q(a.x), to_q(a.y));
    let (bx, by) = (to_q(b.x), to_q(b.y));
    let (cx, cy) = (to_q(c.x), to_q(c.y));

    let dx1 = Rational::from(&bx - &ax);
    let dy1 = Rational::from(&by - &ay);
    let dx2 = Rational::from(&cx - &ax);
    let dy2 = Rational::from(&cy - &ay);
    let det = Rational::from(&dx1 * &dy2) - Rational::from(&dy1 * &dx2);

    match det.cmp0() {
        std::cmp::Ordering::Greater => Orientation::CounterClockwise,
        std::cmp::Ordering::Less => Orientation::Clockwise,
        std::cmp::Ordering::Equal => Orientation::Collinear,
    }
}

#[cfg(not(feature = "exact"))]
fn exact_sign(_a: &Point2<f64>, _b: &Point2<f64>, _c: &Point2<f64>) -> Orientation {
    Orientation::Collinear
}

#[cfg(test)]
mod tests {
    use super::{Orientation, orient2d, orient2d_sign};
    use crate::geometry::Point2;

    #[test]
    fn ccw_test() {
        let a = Point2 { x: 0.0, y: 0.0 };
        let b = Point2 { x: 1.0, y: 0.0 };
        let c = Point2 { x: 0.0, y: 1.0 };

        assert!(orient2d(&a, &b, &c) > 0.0);
        assert_eq!(orient2d_sign(&a, &b, &c), Orientation::CounterClockwise);
        assert_eq!(orient2d_sign(&a, &c, &b), Orientation::Clockwise);
    }

    #[test]
    fn collinear_points() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        let c = Point2::new(3.0, 3.0);
        assert_eq!(orient2d_sign(&a, &b, &c), Orientation::Collinear);
        assert_eq!(orient2d_sign(&a, &b, &c).as_i8(), 0);
    }
}
