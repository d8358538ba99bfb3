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

use num_traits::{Float, NumCast};

use std::fmt::Debug;

/// Coordinate type accepted by the geometry layer.
///
/// The mesher itself runs on `f64`; `f32` is kept so the kernel predicates can be
/// exercised at lower precision.
pub trait Scalar: Float + Debug + Default + Send + Sync + 'static {
    fn from_num_den(num: i32, den: i32) -> Self {
        let n: Self = <Self as NumCast>::from(num).unwrap_or_else(Self::zero);
        let d: Self = <Self as NumCast>::from(den).unwrap_or_else(Self::one);
        n / d
    }

    /// Lossless-enough conversion used by diagnostics and the exact kernel.
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    /// Relative tolerance used by approximate comparisons.
    fn tolerance() -> Self;
}

impl Scalar for f64 {
    fn tolerance() -> Self {
        1e-10
    }
}

impl Scalar for f32 {
    fn tolerance() -> Self {
        1e-5
    }
}

#[cfg(test)]
mod tests {
    use super::Scalar;

    #[test]
    fn from_num_den_halves() {
        assert_eq!(f64::from_num_den(1, 2), 0.5);
        assert_eq!(f32::from_num_den(3, 4), 0.75);
    }
}
