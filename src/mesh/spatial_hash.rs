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

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::geometry::{Point2, Segment2};

/// Uniform grid over front segments, keyed by integer cell coordinates.
/// Each segment is registered in every cell its padded bounds touch.
#[derive(Debug, Clone)]
pub struct FrontGrid {
    cell: f64,
    inv: f64,
    cells: AHashMap<(i64, i64), SmallVec<[usize; 4]>>,
}

impl FrontGrid {
    pub fn new(cell: f64) -> Self {
        let mut cell = cell.max(1e-12);
        if !cell.is_finite() {
            cell = 1.0;
        }
        Self {
            cell,
            inv: 1.0 / cell,
            cells: AHashMap::default(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    #[inline(always)]
    fn floor_sat_i64(x: f64) -> i64 {
        if !x.is_finite() {
            return if x.is_sign_positive() { i64::MAX } else { i64::MIN };
        }
        let i = x as i64;
        i - ((i as f64 > x) as i64)
    }

    #[inline(always)]
    pub fn key(&self, p: &Point2<f64>) -> (i64, i64) {
        (
            Self::floor_sat_i64(p.x * self.inv),
            Self::floor_sat_i64(p.y * self.inv),
        )
    }

    fn cell_range(&self, seg: &Segment2<f64>, pad: f64) -> ((i64, i64), (i64, i64)) {
        let (lo, hi) = seg.bounds();
        let lo = self.key(&Point2::new(lo.x - pad, lo.y - pad));
        let hi = self.key(&Point2::new(hi.x + pad, hi.y + pad));
        (lo, hi)
    }

    pub fn insert(&mut self, id: usize, seg: &Segment2<f64>, pad: f64) {
        let ((x0, y0), (x1, y1)) = self.cell_range(seg, pad);
        for x in x0..=x1 {
            for y in y0..=y1 {
                self.cells.entry((x, y)).or_default().push(id);
            }
        }
    }

    /// Ids whose cells overlap the padded bounds of `seg`, ascending, no repeats.
    pub fn query(&self, seg: &Segment2<f64>, pad: f64) -> SmallVec<[usize; 16]> {
        let ((x0, y0), (x1, y1)) = self.cell_range(seg, pad);
        let mut out: SmallVec<[usize; 16]> = SmallVec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(ids) = self.cells.get(&(x, y)) {
                    out.extend(ids.iter().copied());
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
