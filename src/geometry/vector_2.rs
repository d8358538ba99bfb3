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

use crate::numeric::Scalar;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2<T: Scalar> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar> Vector2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: T::zero(), y: T::zero() }
    }

    /// Unit vector at `angle` radians from +x.
    pub fn from_angle(angle: T) -> Self {
        Self { x: angle.cos(), y: angle.sin() }
    }

    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(&self, other: &Self) -> T {
        self.x * other.y - self.y * other.x
    }

    pub fn norm2(&self) -> T {
        self.dot(self)
    }

    pub fn norm(&self) -> T {
        self.norm2().sqrt()
    }

    /// Returns `None` for (near) zero-length vectors.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n <= T::epsilon() || !n.is_finite() {
            return None;
        }
        Some(Self { x: self.x / n, y: self.y / n })
    }

    pub fn scale(&self, s: T) -> Self {
        Self { x: self.x * s, y: self.y * s }
    }

    /// Counter-clockwise rotation by `angle` radians.
    pub fn rotate(&self, angle: T) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Left-hand normal (rotated +90°).
    pub fn perp_left(&self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    pub fn angle(&self) -> T {
        self.y.atan2(self.x)
    }
}

impl<T: Scalar> Add for Vector2<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl<T: Scalar> AddAssign for Vector2<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.x = self.x + rhs.x;
        self.y = self.y + rhs.y;
    }
}

impl<T: Scalar> Sub for Vector2<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl<T: Scalar> Mul<T> for Vector2<T> {
    type Output = Self;
    fn mul(self, rhs: T) -> Self {
        self.scale(rhs)
    }
}

impl<T: Scalar> Div<T> for Vector2<T> {
    type Output = Self;
    fn div(self, rhs: T) -> Self {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl<T: Scalar> Neg for Vector2<T> {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}
