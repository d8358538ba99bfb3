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

use crate::{
    geometry::{Point2, Vector2},
    numeric::Scalar,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2<T: Scalar> {
    pub a: Point2<T>,
    pub b: Point2<T>,
}

impl<T: Scalar> Segment2<T> {
    pub fn new(a: Point2<T>, b: Point2<T>) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> T {
        self.a.distance_to(&self.b)
    }

    pub fn midpoint(&self) -> Point2<T> {
        self.a.midpoint(&self.b)
    }

    pub fn direction(&self) -> Vector2<T> {
        self.b - self.a
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.b, self.a)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Point2<T>, Point2<T>) {
        (
            Point2::new(self.a.x.min(self.b.x), self.a.y.min(self.b.y)),
            Point2::new(self.a.x.max(self.b.x), self.a.y.max(self.b.y)),
        )
    }

    /// Bounding boxes overlap once both are inflated by `pad`.
    pub fn bounds_overlap(&self, other: &Self, pad: T) -> bool {
        let (lo0, hi0) = self.bounds();
        let (lo1, hi1) = other.bounds();
        lo0.x - pad <= hi1.x && lo1.x - pad <= hi0.x && lo0.y - pad <= hi1.y && lo1.y - pad <= hi0.y
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: &Point2<T>) -> T {
        let d = self.direction();
        let len2 = d.norm2();
        if len2 <= T::epsilon() {
            return self.a.distance_to(p);
        }
        let t = ((*p - self.a).dot(&d) / len2).max(T::zero()).min(T::one());
        self.a.lerp(&self.b, t).distance_to(p)
    }
}
