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

//! Laplacian relaxation and front angle refresh.

use tracing::trace;

use crate::{
    error::PaveResult,
    geometry::{
        Point2, Segment2,
        util::{interior_angle, quad_is_convex, quad_signed_area},
    },
    mesh::NodeId,
    paving::{
        driver::Paver,
        front::{FrontEdge, segments_clear},
        scratch::Scratch,
    },
};

/// Fractions of the Laplacian step tried in turn.
const STEP_FRACTIONS: [f64; 2] = [1.0, 0.5];

impl Paver<'_> {
    /// Recomputes the interior angle of every node on loop `lp`.
    pub fn update_angles(&mut self, lp: usize) -> PaveResult<()> {
        if !self.front.perimeter(lp)?.active {
            return Ok(());
        }
        for n in self.front.loop_nodes(lp)? {
            let rec = self.front.record(n)?;
            let (prev, next) = (rec.prev, rec.next);
            let angle = interior_angle(
                &self.store.position(prev)?,
                &self.store.position(n)?,
                &self.store.position(next)?,
            )
            .unwrap_or(f64::NAN);
            self.front.record_mut(n)?.angle = angle;
        }
        Ok(())
    }

    pub fn update_all_angles(&mut self) -> PaveResult<()> {
        let loops: Vec<usize> = self.front.active_loops().collect();
        for lp in loops {
            self.update_angles(lp)?;
        }
        Ok(())
    }

    /// Smooths every dirty node, clears the dirty set and refreshes front
    /// angles. Returns the number of accepted moves.
    pub fn relax(&mut self, scratch: &mut Scratch) -> PaveResult<usize> {
        scratch.relax.clear();
        scratch
            .relax
            .extend(self.store.nodes().filter(|(_, n)| n.dirty).map(|(id, _)| id));
        let mut moved = 0;
        for _ in 0..self.params.smoothing_passes {
            self.front.edges(&self.store, &mut scratch.edges)?;
            for &n in &scratch.relax {
                if self.smooth_node(n, &scratch.edges)? {
                    moved += 1;
                }
            }
        }
        for &n in &scratch.relax {
            if let Ok(node) = self.store.node_mut(n) {
                node.dirty = false;
            }
        }
        if moved > 0 {
            trace!(nodes = scratch.relax.len(), moved, "relaxed");
        }
        self.stats.relaxed_nodes += moved;
        self.update_all_angles()?;
        Ok(moved)
    }

    /// Sweeps every movable node once all loops are closed.
    pub(crate) fn final_smoothing(&mut self) -> PaveResult<usize> {
        let nodes: Vec<NodeId> = self
            .store
            .nodes()
            .filter(|(_, n)| !n.fixed)
            .map(|(id, _)| id)
            .collect();
        let mut moved = 0;
        for _ in 0..self.params.final_smoothing_passes {
            for &n in &nodes {
                if self.smooth_node(n, &[])? {
                    moved += 1;
                }
            }
        }
        self.stats.relaxed_nodes += moved;
        Ok(moved)
    }

    /// One Laplacian move of `n`. Front nodes only slide along the front.
    fn smooth_node(&mut self, n: NodeId, edges: &[FrontEdge]) -> PaveResult<bool> {
        let Ok(node) = self.store.node(n) else {
            return Ok(false);
        };
        if node.fixed {
            return Ok(false);
        }
        let pos = node.position;
        let mut nbrs = Vec::with_capacity(node.lines.len());
        for m in self.store.neighbors(n)? {
            nbrs.push(self.store.position(m)?);
        }
        let Some(target) = Point2::centroid(nbrs) else {
            return Ok(false);
        };
        let mut delta = target - pos;

        let on_front = self.front.get(n).map(|rec| (rec.prev, rec.next));
        if let Some((prev, next)) = on_front {
            let tangent = self.store.position(next)? - self.store.position(prev)?;
            let Some(t) = tangent.normalized() else {
                return Ok(false);
            };
            delta = t.scale(delta.dot(&t));
        }
        if delta.norm2() <= 1e-24 {
            return Ok(false);
        }

        for fraction in STEP_FRACTIONS {
            let candidate = pos + delta.scale(fraction);
            if !self.move_keeps_quads(n, candidate)? {
                continue;
            }
            if let Some((prev, next)) = on_front {
                let probes = [
                    (Segment2::new(self.store.position(prev)?, candidate), [Some(prev), Some(n)]),
                    (Segment2::new(candidate, self.store.position(next)?), [Some(n), Some(next)]),
                ];
                let tol = 1e-9 * delta.norm().max(1.0);
                if !segments_clear(edges, &probes, &[prev, n, next], tol) {
                    continue;
                }
            }
            self.store.set_position(n, candidate)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Every quad around `n` keeps positive area, and stays convex if it was.
    pub(crate) fn move_keeps_quads(&self, n: NodeId, to: Point2<f64>) -> PaveResult<bool> {
        for q in self.store.quads_around(n)? {
            let before = self.store.quad_positions(q)?;
            let quad = self.store.quad(q)?;
            let mut after = before;
            for (slot, id) in after.iter_mut().zip(quad.nodes) {
                if id == n {
                    *slot = to;
                }
            }
            if quad_signed_area(&after) <= 0.0 {
                return Ok(false);
            }
            if quad_is_convex(&before) && !quad_is_convex(&after) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
