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

//! Bridges between facing front edges: collapse within a loop, merge across
//! loops.

use tracing::{debug, trace};

use crate::{
    error::PaveResult,
    geometry::{Segment2, util::quad_is_acceptable},
    kernel::{Orientation, orient2d_sign},
    mesh::{FrontGrid, NodeId, PlannedNode},
    paving::{
        driver::Paver,
        front::{FrontEdge, ProbeSegment, region_clear, segments_clear},
        row::CLEARANCE,
        scratch::Scratch,
    },
};

/// Two facing front edges `u1 -> u2` and `v1 -> v2` to be joined by the quad
/// `[u1, u2, v1, v2]`.
#[derive(Debug, Clone, Copy)]
pub struct Bridge {
    pub u1: NodeId,
    pub u2: NodeId,
    pub v1: NodeId,
    pub v2: NodeId,
    pub lp_u: usize,
    pub lp_v: usize,
    /// Bridge lengths over the mean edge length; lower is better.
    pub score: f64,
}

impl Paver<'_> {
    /// Splits loop `lp` with a bridge quad across a narrow neck. Returns
    /// `Ok(false)`, with nothing changed, when no bridge qualifies.
    pub fn collapse_loop(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        if self.front.perimeter(lp)?.len <= 6 {
            return Ok(false);
        }
        self.front.edges(&self.store, &mut scratch.edges)?;
        let Some(bridge) = self.find_bridge(lp, false, &scratch.edges)? else {
            return Ok(false);
        };
        self.link_bridge(&bridge)?;
        let other = self
            .front
            .split_loop_at_bridge(lp, bridge.u1, bridge.u2, bridge.v1, bridge.v2)?;
        for part in [lp, other] {
            if self.front.perimeter(part)?.len == 2 {
                self.front.retire_loop(part)?;
                self.stats.closures += 1;
            } else {
                self.update_angles(part)?;
            }
        }
        self.stats.collapses += 1;
        debug!(loop_id = lp, split_off = other, score = bridge.score, "loop collapsed");
        Ok(true)
    }

    /// Joins loop `lp` with another active loop through a bridge quad and
    /// re-classifies the result. Returns `Ok(false)` when no pair of edges
    /// faces across the gap.
    pub fn merge_loops(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        if self.front.active_loops().nth(1).is_none() {
            return Ok(false);
        }
        self.front.edges(&self.store, &mut scratch.edges)?;
        let Some(bridge) = self.find_bridge(lp, true, &scratch.edges)? else {
            return Ok(false);
        };
        self.link_bridge(&bridge)?;
        self.front.join_loops_at_bridge(
            bridge.lp_u,
            bridge.u1,
            bridge.u2,
            bridge.lp_v,
            bridge.v1,
            bridge.v2,
        )?;
        self.stats.merges += 1;
        debug!(loop_id = lp, absorbed = bridge.lp_v, score = bridge.score, "loops merged");
        self.classify_loop(lp, scratch)?;
        Ok(true)
    }

    /// Best bridge from an edge of `lp` to an edge of the same loop
    /// (`across == false`) or of another loop, preferring the loop's sibling.
    pub fn find_bridge(&self, lp: usize, across: bool, edges: &[FrontEdge]) -> PaveResult<Option<Bridge>> {
        let longest = edges.iter().map(|e| e.seg.length()).fold(0.0, f64::max);
        if longest <= 0.0 {
            return Ok(None);
        }
        let mut grid = FrontGrid::new(longest);
        for (i, e) in edges.iter().enumerate() {
            grid.insert(i, &e.seg, 0.0);
        }
        let reach = self.params.bridge_ratio * longest;

        let mut best: Option<Bridge> = None;
        for (i, e) in edges.iter().enumerate() {
            if e.lp != lp {
                continue;
            }
            for j in grid.query(&e.seg, reach) {
                let f = &edges[j];
                let wanted = if across { f.lp != lp } else { f.lp == lp && j > i };
                if !wanted {
                    continue;
                }
                if let Some(score) = self.bridge_score(e, f, edges)? {
                    let bridge = Bridge {
                        u1: e.from,
                        u2: e.to,
                        v1: f.from,
                        v2: f.to,
                        lp_u: e.lp,
                        lp_v: f.lp,
                        score,
                    };
                    if best.as_ref().is_none_or(|b| self.bridge_beats(&bridge, b)) {
                        best = Some(bridge);
                    }
                }
            }
        }
        Ok(best)
    }

    /// Bridges to a sibling loop win over any other; lower scores break ties.
    fn bridge_beats(&self, a: &Bridge, b: &Bridge) -> bool {
        let (sa, sb) = (
            self.front.are_siblings(a.lp_u, a.lp_v),
            self.front.are_siblings(b.lp_u, b.lp_v),
        );
        if sa != sb {
            return sa;
        }
        a.score < b.score
    }

    fn bridge_score(&self, e: &FrontEdge, f: &FrontEdge, edges: &[FrontEdge]) -> PaveResult<Option<f64>> {
        let (u1, u2, v1, v2) = (e.from, e.to, f.from, f.to);
        if [u1, u2].iter().any(|n| *n == v1 || *n == v2) {
            return Ok(None);
        }
        let (le, lf) = (e.seg.length(), f.seg.length());
        if le <= 0.0 || lf <= 0.0 {
            return Ok(None);
        }
        let cos = e.seg.direction().dot(&f.seg.direction()) / (le * lf);
        if cos > -self.params.bridge_alignment {
            return Ok(None);
        }
        let facing = orient2d_sign(&e.seg.a, &e.seg.b, &f.seg.midpoint()) == Orientation::CounterClockwise
            && orient2d_sign(&f.seg.a, &f.seg.b, &e.seg.midpoint()) == Orientation::CounterClockwise;
        if !facing {
            return Ok(None);
        }
        let mean = 0.5 * (le + lf);
        let (d1, d2) = (e.seg.a.distance_to(&f.seg.b), e.seg.b.distance_to(&f.seg.a));
        let limit = self.params.bridge_ratio * mean;
        if d1 >= limit || d2 >= limit {
            return Ok(None);
        }
        if e.lp == f.lp {
            let Some(part) = self.run_length(u2, v1)? else {
                return Ok(None);
            };
            if part % 2 != 0 {
                return Ok(None);
            }
        }

        let quad = [e.seg.a, e.seg.b, f.seg.a, f.seg.b];
        if !quad_is_acceptable(&quad, self.params.min_element_angle, self.params.max_element_angle) {
            return Ok(None);
        }
        let mut probes: Vec<ProbeSegment> = Vec::with_capacity(2);
        for (a, b, seg) in [(u1, v2, Segment2::new(e.seg.a, f.seg.b)), (u2, v1, Segment2::new(e.seg.b, f.seg.a))] {
            match self.store.line_between(a, b) {
                Some(_) => {
                    let along_front = self.front.next(a)? == b || self.front.next(b)? == a;
                    if !along_front || self.store.line_quad_count(a, b).unwrap_or(2) >= 2 {
                        return Ok(None);
                    }
                }
                None => probes.push((seg, [Some(a), Some(b)])),
            }
        }
        let ignore = [u1, u2, v1, v2];
        if !segments_clear(edges, &probes, &ignore, CLEARANCE * mean)
            || !region_clear(edges, &[quad], &ignore)
        {
            trace!(u1 = %u1, v1 = %v1, "bridge crosses the front");
            return Ok(None);
        }
        Ok(Some((d1 + d2) / mean))
    }

    /// Nodes from `from` to `to` inclusive along the front, if `to` is
    /// reached within one lap.
    fn run_length(&self, from: NodeId, to: NodeId) -> PaveResult<Option<usize>> {
        let lap = self.front.perimeter(self.front.record(from)?.lp)?.len;
        let mut cur = from;
        for count in 1..=lap {
            if cur == to {
                return Ok(Some(count));
            }
            cur = self.front.next(cur)?;
        }
        Ok(None)
    }

    fn link_bridge(&mut self, b: &Bridge) -> PaveResult<()> {
        let quad = [b.u1, b.u2, b.v1, b.v2];
        let lines = self.store.count_new_lines(&[quad.map(PlannedNode::Existing)]);
        self.store.reserve(0, lines, 1)?;
        self.store.link_quad(quad)?;
        for n in quad {
            self.store.mark_dirty(n)?;
        }
        Ok(())
    }
}
