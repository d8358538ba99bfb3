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

//! Finished meshes and run statistics.

use crate::geometry::{Point2, util::polygon_signed_area};

/// Operator counters for one paving run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaveStats {
    pub iterations: usize,
    pub rows: usize,
    /// Rows that went all the way around a loop with no END node.
    pub circular_rows: usize,
    pub closures: usize,
    pub pinches: usize,
    pub collapses: usize,
    pub merges: usize,
    pub wedges: usize,
    /// Accepted relaxation moves.
    pub relaxed_nodes: usize,
}

/// An all-quad mesh. The first `boundary_points` entries of `points` are the
/// caller's point table, unchanged and in the same order.
#[derive(Debug, Clone)]
pub struct QuadMesh {
    pub points: Vec<Point2<f64>>,
    /// Point indices, counter-clockwise.
    pub quads: Vec<[usize; 4]>,
    pub stats: PaveStats,
    boundary_points: usize,
}

impl QuadMesh {
    pub(crate) fn new(
        points: Vec<Point2<f64>>,
        quads: Vec<[usize; 4]>,
        stats: PaveStats,
        boundary_points: usize,
    ) -> Self {
        Self {
            points,
            quads,
            stats,
            boundary_points,
        }
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Number of input points carried over from the boundary.
    pub fn boundary_point_count(&self) -> usize {
        self.boundary_points
    }

    /// Points the mesher created.
    pub fn interior_point_count(&self) -> usize {
        self.points.len() - self.boundary_points
    }

    pub fn quad_points(&self, quad: usize) -> Option<[Point2<f64>; 4]> {
        let q = self.quads.get(quad)?;
        Some([
            *self.points.get(q[0])?,
            *self.points.get(q[1])?,
            *self.points.get(q[2])?,
            *self.points.get(q[3])?,
        ])
    }

    pub fn signed_area(&self, quad: usize) -> Option<f64> {
        self.quad_points(quad).map(|q| polygon_signed_area(&q))
    }

    /// Sum of every quad's signed area.
    pub fn total_area(&self) -> f64 {
        (0..self.quads.len())
            .filter_map(|q| self.signed_area(q))
            .sum()
    }
}
