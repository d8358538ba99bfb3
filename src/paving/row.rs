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

//! Row advance: one layer of quads along an END-to-END run of the front.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    error::{PaveError, PaveResult},
    geometry::{Point2, Segment2, util::{interior_angle, quad_is_acceptable}},
    kernel::segments_conflict,
    mesh::{Node, NodeId, PlannedNode},
    paving::{
        driver::Paver,
        front::{FrontEdge, NodeKind, ProbeSegment, region_clear, segments_clear},
        params::PaveParams,
        scratch::Scratch,
    },
};

use PlannedNode::{Existing, New};

/// Relative gap a new front segment must keep from the existing front.
pub(crate) const CLEARANCE: f64 = 1e-6;

/// Wedges tried before a single row.
const MAX_ROW_WEDGES: usize = 4;

/// A run of front nodes a row could be laid along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCandidate {
    /// Index of the first run node in the loop's node list.
    pub start: usize,
    /// Front edges covered; the whole loop for a circular row.
    pub edges: usize,
    /// Deepest row among the run nodes.
    pub depth: u32,
    /// No END on the loop: every node projects.
    pub circular: bool,
}

#[derive(Debug)]
struct RowPlan {
    /// New nodes, already in front order.
    positions: Vec<Point2<f64>>,
    sizes: Vec<f64>,
    quads: Vec<[PlannedNode; 4]>,
    first: NodeId,
    last: NodeId,
    depth: u32,
    circular: bool,
}

impl RowPlan {
    fn push(&mut self, p: Point2<f64>, size: f64) -> usize {
        self.positions.push(p);
        self.sizes.push(size);
        self.positions.len() - 1
    }
}

pub(crate) fn resolve_quad(q: &[PlannedNode; 4], created: &[NodeId]) -> PaveResult<[NodeId; 4]> {
    let r = |p: PlannedNode| {
        p.resolve(created)
            .ok_or_else(|| PaveError::geometry("planned node was never created"))
    };
    Ok([r(q[0])?, r(q[1])?, r(q[2])?, r(q[3])?])
}

impl Paver<'_> {
    /// Lays one row on loop `lp`, trying candidates shortest first and
    /// falling back to relaxed element limits. Returns `Ok(false)` when no
    /// candidate fits.
    pub fn advance_row(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        let tiers = [self.params.clone(), self.params.relaxed()];
        self.advance_row_within(lp, scratch, &tiers)
    }

    /// Same as [`Paver::advance_row`], trying each element window of `tiers`
    /// in order.
    pub fn advance_row_within(
        &mut self,
        lp: usize,
        scratch: &mut Scratch,
        tiers: &[PaveParams],
    ) -> PaveResult<bool> {
        let mut wedges = 0;
        loop {
            self.front.loop_nodes_into(lp, &mut scratch.row.nodes)?;
            self.row_candidates(&scratch.row.nodes, &mut scratch.row.candidates)?;
            if wedges == MAX_ROW_WEDGES {
                break;
            }
            let site = match scratch.row.candidates.first() {
                Some(c) => self.wedge_site(&scratch.row.nodes, c)?,
                None => None,
            };
            let Some(site) = site else { break };
            if !self.insert_wedge(site, scratch)? {
                break;
            }
            wedges += 1;
            self.classify_loop(lp, scratch)?;
        }

        self.front.edges(&self.store, &mut scratch.edges)?;
        let mut chosen = None;
        'search: for limits in tiers {
            for cand in &scratch.row.candidates {
                if let Some(plan) = self.plan_row(&scratch.row.nodes, cand, limits, &scratch.edges)? {
                    chosen = Some(plan);
                    break 'search;
                }
                trace!(loop_id = lp, start = cand.start, edges = cand.edges, "row candidate rejected");
            }
        }
        let Some(plan) = chosen else {
            return Ok(wedges > 0);
        };
        self.commit_row(lp, plan)?;
        self.update_angles(lp)?;
        self.pinch_loop(lp, scratch)?;
        Ok(true)
    }

    /// Grows a hole loop by one circular row with every node treated as a
    /// SIDE node. Returns `Ok(false)` for loops that still bound a region and
    /// when the ring does not fit.
    ///
    /// Node kinds of the loop are left as SIDE either way; classify again
    /// before laying a regular row.
    pub fn advance_ring_row(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        let perim = self.front.perimeter(lp)?;
        if !perim.active || !perim.hole || perim.len < 4 {
            return Ok(false);
        }
        if self.front.signed_area(lp, &self.store)? >= 0.0 {
            return Ok(false);
        }
        self.update_angles(lp)?;
        self.front.loop_nodes_into(lp, &mut scratch.row.nodes)?;
        let mut depth = 0;
        for &n in &scratch.row.nodes {
            let rec = self.front.record_mut(n)?;
            rec.kind = NodeKind::Side;
            depth = depth.max(rec.row);
        }
        let ring = RowCandidate {
            start: 0,
            edges: scratch.row.nodes.len(),
            depth,
            circular: true,
        };

        self.front.edges(&self.store, &mut scratch.edges)?;
        for limits in [self.params.clone(), self.params.relaxed()] {
            if let Some(plan) = self.plan_row(&scratch.row.nodes, &ring, &limits, &scratch.edges)? {
                self.commit_row(lp, plan)?;
                self.update_angles(lp)?;
                return Ok(true);
            }
        }
        trace!(loop_id = lp, "ring row rejected");
        Ok(false)
    }

    /// END-to-END runs of a classified loop, best first. A loop without two
    /// ENDs yields one circular candidate.
    pub fn row_candidates(&self, nodes: &[NodeId], out: &mut Vec<RowCandidate>) -> PaveResult<()> {
        out.clear();
        let len = nodes.len();
        if len < 2 {
            return Ok(());
        }
        let mut ends: SmallVec<[usize; 16]> = SmallVec::new();
        let mut rows = Vec::with_capacity(len);
        for (i, &n) in nodes.iter().enumerate() {
            let rec = self.front.record(n)?;
            if rec.kind == NodeKind::End {
                ends.push(i);
            }
            rows.push(rec.row);
        }
        let depth = |start: usize, count: usize| {
            (0..count).map(|j| rows[(start + j) % len]).max().unwrap_or(0)
        };
        if ends.len() >= 2 {
            for w in 0..ends.len() {
                let start = ends[w];
                let edges = (ends[(w + 1) % ends.len()] + len - start) % len;
                if edges + 1 < len {
                    out.push(RowCandidate {
                        start,
                        edges,
                        depth: depth(start, edges + 1),
                        circular: false,
                    });
                }
            }
        } else {
            out.push(RowCandidate {
                start: 0,
                edges: len,
                depth: depth(0, len),
                circular: true,
            });
        }
        out.sort_by_key(|c| (c.edges, c.depth, c.start));
        Ok(())
    }

    /// Distance new nodes are projected from `n`: the mean adjacent edge
    /// length blended with the size hint.
    fn projection_distance(&self, n: NodeId) -> PaveResult<f64> {
        let rec = self.front.record(n)?;
        let p = self.store.position(n)?;
        let mean = 0.5
            * (p.distance_to(&self.store.position(rec.prev)?)
                + p.distance_to(&self.store.position(rec.next)?));
        let w = self.params.size_blend;
        Ok((1.0 - w) * mean + w * self.store.node(n)?.size)
    }

    /// First interior SIDE node of the run whose adjacent edges are too
    /// uneven for a plain projection.
    fn wedge_site(&self, nodes: &[NodeId], cand: &RowCandidate) -> PaveResult<Option<NodeId>> {
        let len = nodes.len();
        let (lo, hi) = if cand.circular { (0, len) } else { (1, cand.edges) };
        for j in lo..hi {
            let n = nodes[(cand.start + j) % len];
            let rec = self.front.record(n)?;
            if rec.kind != NodeKind::Side {
                continue;
            }
            let p = self.store.position(n)?;
            let a = p.distance_to(&self.store.position(rec.prev)?);
            let b = p.distance_to(&self.store.position(rec.next)?);
            if a.min(b) > 0.0 && a.max(b) / a.min(b) > self.params.wedge_ratio {
                return Ok(Some(n));
            }
        }
        Ok(None)
    }

    fn plan_row(
        &self,
        nodes: &[NodeId],
        cand: &RowCandidate,
        limits: &PaveParams,
        edges: &[FrontEdge],
    ) -> PaveResult<Option<RowPlan>> {
        let len = nodes.len();
        let at = |j: usize| nodes[(cand.start + j) % len];
        let run_len = if cand.circular { len } else { cand.edges + 1 };
        let edge_count = if cand.circular { len } else { cand.edges };
        let mut plan = RowPlan {
            positions: Vec::new(),
            sizes: Vec::new(),
            quads: Vec::new(),
            first: at(0),
            last: at(run_len - 1),
            depth: cand.depth + 1,
            circular: cand.circular,
        };

        // (first, last) new node of every projecting run node
        let mut ends: Vec<Option<(usize, usize)>> = Vec::with_capacity(run_len);
        for j in 0..run_len {
            if !cand.circular && (j == 0 || j + 1 == run_len) {
                ends.push(None);
                continue;
            }
            let s = at(j);
            let rec = self.front.record(s)?;
            let p = self.store.position(s)?;
            let next = self.store.position(rec.next)?;
            let Some(theta) = interior_angle(&self.store.position(rec.prev)?, &p, &next) else {
                return Ok(None);
            };
            let Some(u) = (next - p).normalized() else {
                return Ok(None);
            };
            let d = self.projection_distance(s)?;
            let size = self.store.node(s)?.size;
            let q = rec.kind.quads_meeting().max(2);
            if q == 2 {
                let reach = d / (0.5 * theta).sin().max(0.5);
                let i = plan.push(p + u.rotate(0.5 * theta).scale(reach), size);
                ends.push(Some((i, i)));
                continue;
            }
            let alpha = theta / q as f64;
            let diagonal = 2.0 * d * (0.5 * alpha).cos();
            let mut spoke = vec![0usize; q];
            let mut mid = vec![0usize; q];
            for k in (1..q).rev() {
                spoke[k] = plan.push(p + u.rotate(k as f64 * alpha).scale(d), size);
                if k > 1 {
                    mid[k - 1] = plan.push(p + u.rotate((k as f64 - 0.5) * alpha).scale(diagonal), size);
                }
            }
            for k in 1..q - 1 {
                plan.quads.push([Existing(s), New(spoke[k]), New(mid[k]), New(spoke[k + 1])]);
            }
            ends.push(Some((spoke[q - 1], spoke[1])));
        }

        for j in 0..edge_count {
            let (a, b) = (at(j), at(j + 1));
            let last_a = match ends[j] {
                Some((_, l)) => New(l),
                None => Existing(self.front.prev(a)?),
            };
            let first_b = match ends[(j + 1) % run_len] {
                Some((f, _)) => New(f),
                None => Existing(self.front.next(b)?),
            };
            plan.quads.push([Existing(a), Existing(b), first_b, last_a]);
        }

        let mut ignore: SmallVec<[NodeId; 16]> = (0..run_len).map(at).collect();
        if !cand.circular {
            ignore.push(self.front.prev(plan.first)?);
            ignore.push(self.front.next(plan.last)?);
        }
        if self.row_is_admissible(&plan, &ignore, limits, edges)? {
            Ok(Some(plan))
        } else {
            Ok(None)
        }
    }

    fn row_is_admissible(
        &self,
        plan: &RowPlan,
        ignore: &[NodeId],
        limits: &PaveParams,
        edges: &[FrontEdge],
    ) -> PaveResult<bool> {
        if !plan.positions.iter().all(Point2::is_finite) {
            return Ok(false);
        }
        let locate = |p: PlannedNode| match p {
            Existing(n) => self.store.position(n),
            New(i) => plan
                .positions
                .get(i)
                .copied()
                .ok_or_else(|| PaveError::geometry("row plan index out of range")),
        };
        let mut quads = Vec::with_capacity(plan.quads.len());
        for q in &plan.quads {
            let pts = [locate(q[0])?, locate(q[1])?, locate(q[2])?, locate(q[3])?];
            if !quad_is_acceptable(&pts, limits.min_element_angle, limits.max_element_angle) {
                return Ok(false);
            }
            quads.push(pts);
        }

        let mut chain: Vec<(Point2<f64>, Option<NodeId>)> = Vec::with_capacity(plan.positions.len() + 2);
        if !plan.circular {
            let before = self.front.prev(plan.first)?;
            chain.push((self.store.position(before)?, Some(before)));
        }
        chain.extend(plan.positions.iter().map(|p| (*p, None)));
        if !plan.circular {
            let after = self.front.next(plan.last)?;
            chain.push((self.store.position(after)?, Some(after)));
        }
        let segs = if plan.circular { chain.len() } else { chain.len() - 1 };
        let probes: Vec<ProbeSegment> = (0..segs)
            .map(|i| {
                let (a, na) = chain[i];
                let (b, nb) = chain[(i + 1) % chain.len()];
                (Segment2::new(a, b), [na, nb])
            })
            .collect();
        let scale = probes.iter().map(|(s, _)| s.length()).sum::<f64>() / probes.len().max(1) as f64;
        let tol = CLEARANCE * scale;
        if !segments_clear(edges, &probes, ignore, tol) {
            return Ok(false);
        }
        for i in 0..probes.len() {
            for j in i + 2..probes.len() {
                if plan.circular && i == 0 && j + 1 == probes.len() {
                    continue;
                }
                let shared = probes[i].1.iter().flatten().any(|n| probes[j].1.contains(&Some(*n)));
                if !shared && segments_conflict(&probes[i].0, &probes[j].0, tol) {
                    return Ok(false);
                }
            }
        }
        Ok(region_clear(edges, &quads, ignore))
    }

    fn commit_row(&mut self, lp: usize, plan: RowPlan) -> PaveResult<()> {
        let lines = self.store.count_new_lines(&plan.quads);
        self.store.reserve(plan.positions.len(), lines, plan.quads.len())?;
        let ends = if plan.circular {
            None
        } else {
            Some((self.front.prev(plan.first)?, self.front.next(plan.last)?))
        };

        let mut created = Vec::with_capacity(plan.positions.len());
        for (p, size) in plan.positions.iter().zip(&plan.sizes) {
            let mut node = Node::new(*p, *size);
            node.dirty = true;
            created.push(self.store.add_node(node)?);
        }
        for q in &plan.quads {
            self.store.link_quad(resolve_quad(q, &created)?)?;
        }
        self.front.replace_span(lp, plan.first, plan.last, &created, plan.depth)?;
        if let Some((before, after)) = ends {
            self.store.mark_dirty(before)?;
            self.store.mark_dirty(after)?;
        }

        self.stats.rows += 1;
        if plan.circular {
            self.stats.circular_rows += 1;
        }
        debug!(
            loop_id = lp,
            nodes = created.len(),
            quads = plan.quads.len(),
            circular = plan.circular,
            "row advanced"
        );
        Ok(())
    }
}
