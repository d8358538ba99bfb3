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

use num_traits::NumCast;
use std::ops::{Add, Sub};

use crate::geometry::Vector2;
use crate::numeric::Scalar;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2<T: Scalar> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar> Point2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: T::zero(), y: T::zero() }
    }

    pub fn distance_to(&self, other: &Self) -> T {
        (*other - *self).norm()
    }

    pub fn distance2_to(&self, other: &Self) -> T {
        (*other - *self).norm2()
    }

    pub fn as_vector(&self) -> Vector2<T> {
        Vector2 { x: self.x, y: self.y }
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        let half = T::from_num_den(1, 2);
        Self {
            x: (self.x + other.x) * half,
            y: (self.y + other.y) * half,
        }
    }

    /// Linear interpolation, `t = 0` gives `self`.
    pub fn lerp(&self, other: &Self, t: T) -> Self {
        *self + (*other - *self).scale(t)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Arithmetic mean of a non-empty point set.
    pub fn centroid<I: IntoIterator<Item = Self>>(points: I) -> Option<Self> {
        let mut acc = Vector2::zero();
        let mut count = 0usize;
        for p in points {
            acc += p.as_vector();
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = <T as NumCast>::from(count)?;
        Some(Self { x: acc.x / n, y: acc.y / n })
    }
}

impl<T: Scalar> Sub for Point2<T> {
    type Output = Vector2<T>;
    fn sub(self, rhs: Self) -> Vector2<T> {
        Vector2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Scalar> Add<Vector2<T>> for Point2<T> {
    type Output = Point2<T>;
    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Scalar> Sub<Vector2<T>> for Point2<T> {
    type Output = Point2<T>;
    fn sub(self, rhs: Vector2<T>) -> Point2<T> {
        Point2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Scalar> From<(T, T)> for Point2<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::Point2;

    #[test]
    fn centroid_of_square() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let c = Point2::centroid(pts).unwrap();
        assert_eq!(c, Point2::new(1.0, 1.0));
        assert!(Point2::<f64>::centroid(std::iter::empty()).is_none());
    }
}
