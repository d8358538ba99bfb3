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

//! Pinch: closes an acute front node by sewing its two neighbors together.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    error::{PaveError, PaveResult},
    geometry::{
        Point2, Segment2,
        util::{interior_angle, quad_angle_range, quad_is_convex, quad_signed_area},
    },
    mesh::{LineId, NodeId},
    paving::{
        driver::Paver,
        front::{FrontEdge, ProbeSegment, segments_clear},
        row::CLEARANCE,
        scratch::Scratch,
    },
};

/// Wedges a single pinch pass may insert to even out the apex edges.
const MAX_PINCH_WEDGES: usize = 2;

/// What the begin phase hands to the commit phase.
#[derive(Debug, Clone)]
pub struct PinchPlan {
    pub lp: usize,
    pub apex: NodeId,
    /// Front neighbors of the apex, in loop order.
    pub prev: NodeId,
    pub next: NodeId,
    pub keep: NodeId,
    pub gone: NodeId,
    /// Apex line that survives and takes over the quads of `gone_line`.
    pub keep_line: LineId,
    pub gone_line: LineId,
    pub position: Point2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchReject {
    NotOnFront,
    LoopTooSmall,   // fewer than four nodes would remain
    BoundaryLines,  // both apex lines are bare boundary
    BothFixed,
    NeighborsAdjacent,
    SharedNeighbor, // merging would duplicate a line
    SharedQuad,     // merging would squash a quad
    InvertedQuad,   // a quad flips or loses convexity at the merged position
    FrontCrossing,
    NoGain,         // optional pinch that does not open the front
}

impl Paver<'_> {
    /// Checks whether the apex can be pinched and where the merged node goes.
    /// Nothing is modified.
    pub fn pinch_begin(
        &self,
        apex: NodeId,
        edges: &[FrontEdge],
    ) -> PaveResult<Result<PinchPlan, PinchReject>> {
        let Some(rec) = self.front.get(apex) else {
            return Ok(Err(PinchReject::NotOnFront));
        };
        let (lp, prev, next, angle) = (rec.lp, rec.prev, rec.next, rec.angle);
        if self.front.perimeter(lp)?.len < 6 {
            return Ok(Err(PinchReject::LoopTooSmall));
        }
        let missing = || PaveError::geometry_in(lp, format!("front line missing at {apex}"));
        let prev_line = self.store.line_between(apex, prev).ok_or_else(missing)?;
        let next_line = self.store.line_between(apex, next).ok_or_else(missing)?;
        if self.store.line(prev_line)?.quads.is_empty() && self.store.line(next_line)?.quads.is_empty() {
            return Ok(Err(PinchReject::BoundaryLines));
        }
        let (prev_fixed, next_fixed) = (self.store.node(prev)?.fixed, self.store.node(next)?.fixed);
        if prev_fixed && next_fixed {
            return Ok(Err(PinchReject::BothFixed));
        }
        if self.store.line_between(prev, next).is_some() {
            return Ok(Err(PinchReject::NeighborsAdjacent));
        }
        let around_prev = self.store.neighbors(prev)?;
        let around_next = self.store.neighbors(next)?;
        if around_prev
            .iter()
            .any(|m| *m != apex && around_next.contains(m))
        {
            return Ok(Err(PinchReject::SharedNeighbor));
        }
        let quads_prev = self.store.quads_around(prev)?;
        let quads_next = self.store.quads_around(next)?;
        if quads_prev.iter().any(|q| quads_next.contains(q)) {
            return Ok(Err(PinchReject::SharedQuad));
        }

        let (keep, gone, keep_line, gone_line) = if next_fixed {
            (next, prev, next_line, prev_line)
        } else {
            (prev, next, prev_line, next_line)
        };
        let position = if self.store.node(keep)?.fixed {
            self.store.position(keep)?
        } else {
            self.store.position(prev)?.midpoint(&self.store.position(next)?)
        };

        let mut worst = f64::INFINITY;
        let moved: SmallVec<[_; 16]> = quads_prev.iter().chain(quads_next.iter()).copied().collect();
        for q in moved {
            let before = self.store.quad_positions(q)?;
            let mut after = before;
            for (slot, id) in after.iter_mut().zip(self.store.quad(q)?.nodes) {
                if id == prev || id == next {
                    *slot = position;
                }
            }
            if quad_signed_area(&after) <= 0.0 || (quad_is_convex(&before) && !quad_is_convex(&after)) {
                return Ok(Err(PinchReject::InvertedQuad));
            }
            worst = worst.min(quad_angle_range(&after).0);
        }

        let before = self.front.prev(prev)?;
        let after = self.front.next(next)?;
        let (pb, pa) = (self.store.position(before)?, self.store.position(after)?);
        let probes: [ProbeSegment; 2] = [
            (Segment2::new(pb, position), [Some(before), Some(keep)]),
            (Segment2::new(position, pa), [Some(keep), Some(after)]),
        ];
        let scale = pb.distance_to(&position).max(position.distance_to(&pa));
        if !segments_clear(edges, &probes, &[prev, apex, next], CLEARANCE * scale) {
            return Ok(Err(PinchReject::FrontCrossing));
        }

        if angle >= self.params.pinch_always {
            let opened = interior_angle(&pb, &position, &pa).unwrap_or(0.0);
            if opened <= angle || worst < self.params.min_element_angle {
                return Ok(Err(PinchReject::NoGain));
            }
        }
        Ok(Ok(PinchPlan {
            lp,
            apex,
            prev,
            next,
            keep,
            gone,
            keep_line,
            gone_line,
            position,
        }))
    }

    /// Applies a plan from [`Paver::pinch_begin`]: the apex lines fold into
    /// one, `gone` is merged into `keep` and the loop loses two nodes.
    pub fn pinch_commit(&mut self, plan: PinchPlan) -> PaveResult<()> {
        let row = self.front.record(plan.keep)?.row;
        self.store.set_position(plan.keep, plan.position)?;
        self.store.merge_lines(plan.keep_line, plan.gone_line)?;
        self.store.retarget_node(plan.gone, plan.keep)?;
        self.store.delete_node(plan.gone)?;
        self.front
            .replace_span(plan.lp, plan.prev, plan.next, &[plan.keep], row)?;
        self.store.mark_dirty(plan.keep)?;
        self.store.mark_dirty(plan.apex)?;
        self.stats.pinches += 1;
        self.update_angles(plan.lp)?;
        debug!(loop_id = plan.lp, apex = %plan.apex, keep = %plan.keep, "front pinched");
        Ok(())
    }

    /// Pinches acute nodes of loop `lp`, sharpest first, until none
    /// qualifies. Returns the number of pinches.
    pub fn pinch_loop(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<usize> {
        let mut applied = 0;
        let mut wedges = 0;
        loop {
            if !self.front.perimeter(lp)?.active {
                break;
            }
            self.update_angles(lp)?;
            self.front.loop_nodes_into(lp, &mut scratch.pinch)?;
            if scratch.pinch.len() < 6 {
                break;
            }
            let mut sharp: SmallVec<[(f64, NodeId); 8]> = SmallVec::new();
            for &n in &scratch.pinch {
                let angle = self.front.record(n)?.angle;
                if angle < self.params.pinch_if_helps {
                    sharp.push((angle, n));
                }
            }
            if sharp.is_empty() {
                break;
            }
            sharp.sort_by(|a, b| a.0.total_cmp(&b.0));
            self.front.edges(&self.store, &mut scratch.edges)?;

            let mut changed = false;
            for (_, apex) in sharp {
                if wedges < MAX_PINCH_WEDGES {
                    if let Some(far) = self.uneven_neighbor(apex)? {
                        if self.insert_wedge(far, scratch)? {
                            wedges += 1;
                            changed = true;
                            break;
                        }
                    }
                }
                match self.pinch_begin(apex, &scratch.edges)? {
                    Ok(plan) => {
                        self.pinch_commit(plan)?;
                        applied += 1;
                        changed = true;
                        break;
                    }
                    Err(reason) => trace!(apex = %apex, ?reason, "pinch rejected"),
                }
            }
            if !changed {
                break;
            }
        }
        Ok(applied)
    }

    /// The apex neighbor behind the longer edge, when the two apex edges
    /// differ by more than the wedge ratio.
    fn uneven_neighbor(&self, apex: NodeId) -> PaveResult<Option<NodeId>> {
        let rec = self.front.record(apex)?;
        let p = self.store.position(apex)?;
        let back = p.distance_to(&self.store.position(rec.prev)?);
        let ahead = p.distance_to(&self.store.position(rec.next)?);
        let short = back.min(ahead);
        if short <= 0.0 || back.max(ahead) / short <= self.params.wedge_ratio {
            return Ok(None);
        }
        Ok(Some(if ahead > back { rec.next } else { rec.prev }))
    }
}
