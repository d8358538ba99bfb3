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

//! Main paving loop.

use ahash::AHashMap;
use tracing::{debug, info, warn};

use crate::{
    error::{PaveError, PaveResult},
    geometry::Point2,
    mesh::{Capacity, FrontStore, NodeId},
    paving::{
        front::Front,
        input::BoundaryInput,
        output::{PaveStats, QuadMesh},
        params::PaveParams,
        scratch::Scratch,
    },
};

/// What one iteration did to its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Closure,
    Pinch,
    Collapse,
    Merge,
    Row,
}

/// Step-wise paving of one region.
///
/// Owns the topology store and the front; every operator is a method so it
/// can also be driven in isolation.
#[derive(Debug)]
pub struct Paver<'p> {
    pub(crate) store: FrontStore,
    pub(crate) front: Front,
    pub(crate) params: &'p PaveParams,
    pub(crate) stats: PaveStats,
    base_points: Vec<Point2<f64>>,
    cursor: usize,
    max_iterations: usize,
}

impl<'p> Paver<'p> {
    pub fn new(input: &BoundaryInput, params: &'p PaveParams, capacity: Capacity) -> PaveResult<Self> {
        params.validate()?;
        let (store, front) = input.load(capacity)?;
        let mut paver = Self::assemble(store, front, params, input.points.clone());
        paver.update_all_angles()?;
        Ok(paver)
    }

    /// Wraps an already built store and front. Nodes with a `source` index
    /// keep it in the output; everything else is appended.
    pub fn from_parts(store: FrontStore, front: Front, params: &'p PaveParams) -> PaveResult<Self> {
        params.validate()?;
        let mut base = Vec::new();
        for (_, node) in store.nodes() {
            if let Some(i) = node.source {
                if base.len() <= i {
                    base.resize(i + 1, Point2::origin());
                }
                base[i] = node.position;
            }
        }
        let mut paver = Self::assemble(store, front, params, base);
        paver.update_all_angles()?;
        Ok(paver)
    }

    fn assemble(store: FrontStore, front: Front, params: &'p PaveParams, base_points: Vec<Point2<f64>>) -> Self {
        let max_iterations = params
            .max_iterations
            .unwrap_or(4 * store.capacity().quads + 64);
        Self {
            store,
            front,
            params,
            stats: PaveStats::default(),
            base_points,
            cursor: 0,
            max_iterations,
        }
    }

    pub fn store(&self) -> &FrontStore {
        &self.store
    }

    pub fn front(&self) -> &Front {
        &self.front
    }

    pub fn params(&self) -> &PaveParams {
        self.params
    }

    pub fn stats(&self) -> PaveStats {
        self.stats
    }

    /// True once every loop has been closed.
    pub fn is_done(&self) -> bool {
        self.front.active_loops().next().is_none()
    }

    /// Advances the next active loop (round-robin) by one operator.
    /// Returns `Ok(false)` when no loop is left.
    pub fn step(&mut self, scratch: &mut Scratch) -> PaveResult<bool> {
        let Some(lp) = self.next_loop() else {
            return Ok(false);
        };
        self.stats.iterations += 1;
        if self.stats.iterations > self.max_iterations {
            warn!(limit = self.max_iterations, loop_id = lp, "paving iteration limit reached");
            return Err(PaveError::geometry_in(
                lp,
                format!("front did not close within {} iterations", self.max_iterations),
            ));
        }
        let len = self.front.perimeter(lp)?.len;
        let step = self.advance_loop(lp, scratch).map_err(|e| e.on_loop(lp))?;
        debug!(loop_id = lp, len, ?step, "paving step");
        self.relax(scratch)?;
        Ok(true)
    }

    /// Steps until every loop is closed.
    pub fn run(&mut self) -> PaveResult<()> {
        let mut scratch = Scratch::with_front_len(self.front.node_count());
        while self.step(&mut scratch)? {}
        Ok(())
    }

    /// Final smoothing and export. Fails while any loop is still open.
    pub fn finish(mut self) -> PaveResult<QuadMesh> {
        if let Some(lp) = self.front.active_loops().next() {
            return Err(PaveError::geometry_in(lp, "front is still open"));
        }
        self.store.validate()?;
        self.final_smoothing()?;

        let mut points = self.base_points;
        let boundary = points.len();
        let mut index: AHashMap<NodeId, usize> = AHashMap::with_capacity(self.store.counts().0);
        for (id, node) in self.store.nodes() {
            match node.source {
                Some(i) if i < boundary => {
                    index.insert(id, i);
                }
                _ => {
                    index.insert(id, points.len());
                    points.push(node.position);
                }
            }
        }
        let mut quads = Vec::with_capacity(self.store.counts().2);
        for (id, quad) in self.store.quads() {
            let mut out = [0usize; 4];
            for (slot, n) in out.iter_mut().zip(quad.nodes) {
                *slot = *index
                    .get(&n)
                    .ok_or_else(|| PaveError::geometry(format!("{id} references unknown {n}")))?;
            }
            quads.push(out);
        }
        Ok(QuadMesh::new(points, quads, self.stats, boundary))
    }

    fn next_loop(&mut self) -> Option<usize> {
        let count = self.front.loops().len();
        let start = self.cursor;
        let lp = (0..count)
            .map(|k| (start + k) % count)
            .find(|&lp| self.front.loops()[lp].active)?;
        self.cursor = lp + 1;
        Some(lp)
    }

    /// Closure, then pinch, collapse and merge, then a row. When no row
    /// fits: a ring row around a hole, a row in the loosest element window,
    /// a fan closure and an ear cut, in that order.
    fn advance_loop(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<Step> {
        self.update_angles(lp)?;
        let len = self.front.perimeter(lp)?.len;
        if len <= 6 && self.close_small_loop(lp, scratch)? {
            return Ok(Step::Closure);
        }
        if self.pinch_loop(lp, scratch)? > 0 {
            return Ok(Step::Pinch);
        }
        if self.collapse_loop(lp, scratch)? {
            return Ok(Step::Collapse);
        }
        if self.merge_loops(lp, scratch)? {
            return Ok(Step::Merge);
        }
        let classified = match self.classify_loop(lp, scratch) {
            Err(e) if e.is_capacity() => return Err(e),
            other => other,
        };
        if classified.is_ok() && self.advance_row(lp, scratch)? {
            return Ok(Step::Row);
        }

        debug!(loop_id = lp, len, classified = classified.is_ok(), "no regular row fits");
        if self.advance_ring_row(lp, scratch)? {
            return Ok(Step::Row);
        }
        if classified.is_ok() {
            self.classify_loop(lp, scratch)?;
            let loosest = [self.params.loosest()];
            if self.advance_row_within(lp, scratch, &loosest)? {
                return Ok(Step::Row);
            }
        }
        if self.close_with_fan(lp, scratch)? {
            return Ok(Step::Closure);
        }
        if self.cut_ear(lp, scratch)? {
            return Ok(Step::Closure);
        }
        classified?;
        Err(PaveError::geometry_in(lp, format!("no operator applies to a front of {len} nodes")))
    }
}

/// Meshes the region bounded by `input`.
///
/// # Example
///
/// ```
/// use quadpave::{BoundaryInput, Capacity, PaveParams, pave, rectangle_ring};
///
/// let input = BoundaryInput::default().with_ring(rectangle_ring(0.0, 0.0, 2.0, 2.0, 2, 2));
/// let mesh = pave(&input, &PaveParams::default(), Capacity::for_boundary(8)).unwrap();
/// assert_eq!(mesh.quad_count(), 4);
/// ```
pub fn pave(input: &BoundaryInput, params: &PaveParams, capacity: Capacity) -> PaveResult<QuadMesh> {
    let mut paver = Paver::new(input, params, capacity)?;
    paver.run()?;
    let mesh = paver.finish()?;
    info!(
        quads = mesh.quad_count(),
        points = mesh.points.len(),
        iterations = mesh.stats.iterations,
        rows = mesh.stats.rows,
        pinches = mesh.stats.pinches,
        "paving finished"
    );
    Ok(mesh)
}
