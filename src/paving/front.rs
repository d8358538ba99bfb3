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

//! Front records: the cyclic node sequences still to be meshed.

use ahash::AHashMap;

use crate::{
    error::{PaveError, PaveResult},
    geometry::{Point2, Segment2, util::polygon_signed_area},
    kernel::{point_in_convex, segments_conflict},
    mesh::{FrontStore, NodeId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum NodeKind {
    #[default]
    Undecided,
    End,
    Side,
    Corner,
    Reversal,
}

impl NodeKind {
    /// Contribution to the loop's turn count.
    pub fn turn_weight(self) -> i32 {
        match self {
            NodeKind::End => 1,
            NodeKind::Side | NodeKind::Undecided => 0,
            NodeKind::Corner => -1,
            NodeKind::Reversal => -2,
        }
    }

    /// Quads that meet at the node once a row has passed it.
    pub fn quads_meeting(self) -> usize {
        match self {
            NodeKind::End => 1,
            NodeKind::Side | NodeKind::Undecided => 2,
            NodeKind::Corner => 3,
            NodeKind::Reversal => 4,
        }
    }

    /// Adjacent band towards smaller angles.
    pub fn narrower(self) -> Option<Self> {
        match self {
            NodeKind::Side => Some(NodeKind::End),
            NodeKind::Corner => Some(NodeKind::Side),
            NodeKind::Reversal => Some(NodeKind::Corner),
            NodeKind::End | NodeKind::Undecided => None,
        }
    }

    /// Adjacent band towards larger angles.
    pub fn wider(self) -> Option<Self> {
        match self {
            NodeKind::End => Some(NodeKind::Side),
            NodeKind::Side => Some(NodeKind::Corner),
            NodeKind::Corner => Some(NodeKind::Reversal),
            NodeKind::Reversal | NodeKind::Undecided => None,
        }
    }

    /// Kinds a row has to turn or stop at.
    pub fn is_marked(self) -> bool {
        matches!(self, NodeKind::End | NodeKind::Corner | NodeKind::Reversal)
    }
}

/// Whether a node's angle sits clearly inside its band or near an edge
/// shared by two bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleStatus {
    #[default]
    Settled,
    Between(NodeKind, NodeKind),
}

#[derive(Debug, Clone)]
pub struct FrontNode {
    /// Owning loop.
    pub lp: usize,
    pub prev: NodeId,
    pub next: NodeId,
    /// Interior angle in `[0, 2π)`, NaN when a neighbor coincides.
    pub angle: f64,
    pub kind: NodeKind,
    pub status: AngleStatus,
    /// Front steps to the nearest END, CORNER or REVERSAL node.
    pub corner_distance: usize,
    /// Rows advanced before the node was created.
    pub row: u32,
}

impl FrontNode {
    fn new(lp: usize, prev: NodeId, next: NodeId, row: u32) -> Self {
        Self {
            lp,
            prev,
            next,
            angle: f64::NAN,
            kind: NodeKind::Undecided,
            status: AngleStatus::Settled,
            corner_distance: 0,
            row,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Perimeter {
    pub head: NodeId,
    pub len: usize,
    /// Loop this one is expected to merge with (holes point at the outer loop).
    pub sibling: Option<usize>,
    pub hole: bool,
    pub active: bool,
}

/// A directed front edge `from -> next(from)`.
#[derive(Debug, Clone, Copy)]
pub struct FrontEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub lp: usize,
    pub seg: Segment2<f64>,
}

/// Every loop keeps the unmeshed region on its left.
#[derive(Debug, Clone, Default)]
pub struct Front {
    records: AHashMap<NodeId, FrontNode>,
    loops: Vec<Perimeter>,
}

impl Front {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loops(&self) -> &[Perimeter] {
        &self.loops
    }

    pub fn active_loops(&self) -> impl Iterator<Item = usize> + '_ {
        self.loops
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active)
            .map(|(i, _)| i)
    }

    pub fn perimeter(&self, lp: usize) -> PaveResult<&Perimeter> {
        self.loops
            .get(lp)
            .ok_or_else(|| PaveError::geometry(format!("unknown loop {lp}")))
    }

    fn perimeter_mut(&mut self, lp: usize) -> PaveResult<&mut Perimeter> {
        self.loops
            .get_mut(lp)
            .ok_or_else(|| PaveError::geometry(format!("unknown loop {lp}")))
    }

    pub fn set_sibling(&mut self, lp: usize, sibling: Option<usize>) -> PaveResult<()> {
        self.perimeter_mut(lp)?.sibling = sibling;
        Ok(())
    }

    /// True when one loop is recorded as the other's merge partner.
    pub fn are_siblings(&self, a: usize, b: usize) -> bool {
        let points_at = |x: usize, y: usize| self.loops.get(x).is_some_and(|p| p.sibling == Some(y));
        points_at(a, b) || points_at(b, a)
    }

    pub fn get(&self, n: NodeId) -> Option<&FrontNode> {
        self.records.get(&n)
    }

    pub fn contains(&self, n: NodeId) -> bool {
        self.records.contains_key(&n)
    }

    pub fn record(&self, n: NodeId) -> PaveResult<&FrontNode> {
        self.records
            .get(&n)
            .ok_or_else(|| PaveError::geometry(format!("{n} is not on the front")))
    }

    pub fn record_mut(&mut self, n: NodeId) -> PaveResult<&mut FrontNode> {
        self.records
            .get_mut(&n)
            .ok_or_else(|| PaveError::geometry(format!("{n} is not on the front")))
    }

    pub fn next(&self, n: NodeId) -> PaveResult<NodeId> {
        Ok(self.record(n)?.next)
    }

    pub fn prev(&self, n: NodeId) -> PaveResult<NodeId> {
        Ok(self.record(n)?.prev)
    }

    /// Total number of nodes on all active loops.
    pub fn node_count(&self) -> usize {
        self.records.len()
    }

    /// Links `nodes` into a new cyclic loop and returns its id.
    pub fn add_loop(&mut self, nodes: &[NodeId], hole: bool, row: u32) -> PaveResult<usize> {
        if nodes.len() < 2 {
            return Err(PaveError::degenerate("a loop needs at least two nodes"));
        }
        let lp = self.loops.len();
        for (i, &n) in nodes.iter().enumerate() {
            if self.records.contains_key(&n) {
                return Err(PaveError::geometry(format!("{n} is already on a front")));
            }
            let prev = nodes[(i + nodes.len() - 1) % nodes.len()];
            let next = nodes[(i + 1) % nodes.len()];
            self.records.insert(n, FrontNode::new(lp, prev, next, row));
        }
        self.loops.push(Perimeter {
            head: nodes[0],
            len: nodes.len(),
            sibling: None,
            hole,
            active: true,
        });
        Ok(lp)
    }

    /// Nodes of loop `lp` from its head, checking the cycle closes after
    /// exactly `len` steps.
    pub fn loop_nodes(&self, lp: usize) -> PaveResult<Vec<NodeId>> {
        let mut out = Vec::new();
        self.loop_nodes_into(lp, &mut out)?;
        Ok(out)
    }

    pub fn loop_nodes_into(&self, lp: usize, out: &mut Vec<NodeId>) -> PaveResult<()> {
        out.clear();
        let perim = self.perimeter(lp)?;
        if !perim.active {
            return Ok(());
        }
        let mut cur = perim.head;
        for _ in 0..perim.len {
            let rec = self.record(cur)?;
            if rec.lp != lp {
                return Err(PaveError::geometry_in(lp, format!("{cur} belongs to loop {}", rec.lp)));
            }
            out.push(cur);
            cur = rec.next;
        }
        if cur != perim.head {
            return Err(PaveError::geometry_in(lp, "front loop does not close"));
        }
        Ok(())
    }

    /// Front positions of loop `lp` in order.
    pub fn loop_points(&self, lp: usize, store: &FrontStore) -> PaveResult<Vec<Point2<f64>>> {
        self.loop_nodes(lp)?
            .into_iter()
            .map(|n| store.position(n))
            .collect()
    }

    /// Shoelace area of the loop; positive while the unmeshed region is bounded.
    pub fn signed_area(&self, lp: usize, store: &FrontStore) -> PaveResult<f64> {
        Ok(polygon_signed_area(&self.loop_points(lp, store)?))
    }

    /// Replaces the run `first ..= last` (following `next`) with `new`.
    /// When the run is the whole loop, `new` becomes the loop.
    pub fn replace_span(
        &mut self,
        lp: usize,
        first: NodeId,
        last: NodeId,
        new: &[NodeId],
        row: u32,
    ) -> PaveResult<()> {
        let len = self.perimeter(lp)?.len;
        let mut span = Vec::new();
        let mut cur = first;
        loop {
            let rec = self.record(cur)?;
            if rec.lp != lp {
                return Err(PaveError::geometry_in(lp, "replaced span leaves its loop"));
            }
            span.push(cur);
            if cur == last {
                break;
            }
            if span.len() >= len {
                return Err(PaveError::geometry_in(lp, "replaced span does not end"));
            }
            cur = rec.next;
        }

        if span.len() == len && new.is_empty() {
            self.retire_loop(lp)?;
            return Ok(());
        }
        let ends = if span.len() == len {
            None
        } else {
            Some((self.record(first)?.prev, self.record(last)?.next))
        };

        for n in &span {
            self.records.remove(n);
        }
        for (i, &n) in new.iter().enumerate() {
            if self.records.contains_key(&n) {
                return Err(PaveError::geometry_in(lp, format!("{n} is already on a front")));
            }
            let prev = match (i, ends) {
                (0, Some((before, _))) => before,
                (0, None) => new[new.len() - 1],
                _ => new[i - 1],
            };
            let next = match (i + 1 == new.len(), ends) {
                (true, Some((_, after))) => after,
                (true, None) => new[0],
                _ => new[i + 1],
            };
            self.records.insert(n, FrontNode::new(lp, prev, next, row));
        }
        if let Some((before, after)) = ends {
            let (head, tail) = match (new.first(), new.last()) {
                (Some(&h), Some(&t)) => (h, t),
                _ => (after, before),
            };
            self.record_mut(before)?.next = head;
            self.record_mut(after)?.prev = tail;
        }

        let perim = self.perimeter_mut(lp)?;
        perim.len = len - span.len() + new.len();
        if span.contains(&perim.head) {
            perim.head = match (new.first(), ends) {
                (Some(&n), _) => n,
                (None, Some((_, after))) => after,
                (None, None) => perim.head,
            };
        }
        Ok(())
    }

    /// Cuts loop `lp` along the bridge `u1 -> u2` / `v1 -> v2`: afterwards
    /// `u1.next == v2` and `v1.next == u2`. The run `u2 ..= v1` moves to a new
    /// loop whose id is returned.
    pub fn split_loop_at_bridge(
        &mut self,
        lp: usize,
        u1: NodeId,
        u2: NodeId,
        v1: NodeId,
        v2: NodeId,
    ) -> PaveResult<usize> {
        if self.next(u1)? != u2 || self.next(v1)? != v2 {
            return Err(PaveError::geometry_in(lp, "bridge edges are not front edges"));
        }
        let len = self.perimeter(lp)?.len;
        let mut part = Vec::new();
        let mut cur = u2;
        loop {
            part.push(cur);
            if cur == v1 {
                break;
            }
            if part.len() >= len {
                return Err(PaveError::geometry_in(lp, "bridge ends lie on different loops"));
            }
            cur = self.next(cur)?;
        }

        let new_lp = self.loops.len();
        let hole = self.perimeter(lp)?.hole;
        self.record_mut(u1)?.next = v2;
        self.record_mut(v2)?.prev = u1;
        self.record_mut(v1)?.next = u2;
        self.record_mut(u2)?.prev = v1;
        for &n in &part {
            self.record_mut(n)?.lp = new_lp;
        }
        self.loops.push(Perimeter {
            head: u2,
            len: part.len(),
            sibling: None,
            hole,
            active: true,
        });
        let perim = self.perimeter_mut(lp)?;
        perim.len = len - part.len();
        perim.head = u1;
        Ok(new_lp)
    }

    /// Joins loop `b` into loop `a` along the bridge `u1 -> u2` (on `a`) /
    /// `v1 -> v2` (on `b`).
    pub fn join_loops_at_bridge(
        &mut self,
        a: usize,
        u1: NodeId,
        u2: NodeId,
        b: usize,
        v1: NodeId,
        v2: NodeId,
    ) -> PaveResult<()> {
        if a == b {
            return Err(PaveError::geometry_in(a, "joining a loop with itself"));
        }
        if self.next(u1)? != u2 || self.next(v1)? != v2 {
            return Err(PaveError::geometry_in(a, "bridge edges are not front edges"));
        }
        for n in self.loop_nodes(b)? {
            self.record_mut(n)?.lp = a;
        }
        self.record_mut(u1)?.next = v2;
        self.record_mut(v2)?.prev = u1;
        self.record_mut(v1)?.next = u2;
        self.record_mut(u2)?.prev = v1;

        let (b_len, b_hole) = {
            let pb = self.perimeter_mut(b)?;
            let out = (pb.len, pb.hole);
            pb.len = 0;
            pb.active = false;
            pb.sibling = None;
            out
        };
        let pa = self.perimeter_mut(a)?;
        pa.len += b_len;
        pa.hole = pa.hole && b_hole;
        pa.sibling = None;
        for perim in self.loops.iter_mut() {
            if perim.sibling == Some(b) {
                perim.sibling = Some(a);
            }
        }
        Ok(())
    }

    /// Drops every record of loop `lp` and deactivates it.
    pub fn retire_loop(&mut self, lp: usize) -> PaveResult<Vec<NodeId>> {
        let nodes = self.loop_nodes(lp)?;
        for n in &nodes {
            self.records.remove(n);
        }
        let perim = self.perimeter_mut(lp)?;
        perim.active = false;
        perim.len = 0;
        Ok(nodes)
    }

    /// Directed edges of every active loop.
    pub fn edges(&self, store: &FrontStore, out: &mut Vec<FrontEdge>) -> PaveResult<()> {
        out.clear();
        for (lp, perim) in self.loops.iter().enumerate() {
            if !perim.active || perim.len < 2 {
                continue;
            }
            let mut cur = perim.head;
            for _ in 0..perim.len {
                let next = self.next(cur)?;
                out.push(FrontEdge {
                    from: cur,
                    to: next,
                    lp,
                    seg: Segment2::new(store.position(cur)?, store.position(next)?),
                });
                cur = next;
            }
        }
        Ok(())
    }
}

/// A planned segment and the existing nodes at its ends, if any.
pub type ProbeSegment = (Segment2<f64>, [Option<NodeId>; 2]);

/// True when no probe comes within `tol` of a front edge. Front edges with
/// both ends in `ignore`, or sharing an end with the probe, are skipped.
pub fn segments_clear(
    edges: &[FrontEdge],
    probes: &[ProbeSegment],
    ignore: &[NodeId],
    tol: f64,
) -> bool {
    probes.iter().all(|(seg, ends)| {
        edges.iter().all(|e| {
            if ignore.contains(&e.from) && ignore.contains(&e.to) {
                return true;
            }
            let touches = ends
                .iter()
                .flatten()
                .any(|n| *n == e.from || *n == e.to);
            touches || !segments_conflict(seg, &e.seg, tol)
        })
    })
}

/// True when no front node outside `ignore` lies strictly inside one of the
/// counter-clockwise quads.
pub fn region_clear(edges: &[FrontEdge], quads: &[[Point2<f64>; 4]], ignore: &[NodeId]) -> bool {
    edges.iter().all(|e| {
        ignore.contains(&e.from) || quads.iter().all(|q| !point_in_convex(&e.seg.a, q))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Capacity, Node};

    fn ring(store: &mut FrontStore, n: usize) -> Vec<NodeId> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                store
                    .add_node(Node::new(Point2::new(t.cos(), t.sin()), 1.0))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn replace_span_relinks_neighbours() {
        let mut store = FrontStore::new(Capacity::for_boundary(16));
        let ids = ring(&mut store, 8);
        let extra = store.add_node(Node::new(Point2::origin(), 1.0)).unwrap();
        let mut front = Front::new();
        let lp = front.add_loop(&ids, false, 0).unwrap();

        front.replace_span(lp, ids[1], ids[3], &[extra], 1).unwrap();
        let nodes = front.loop_nodes(lp).unwrap();
        assert_eq!(nodes.len(), 6);
        assert_eq!(front.next(ids[0]).unwrap(), extra);
        assert_eq!(front.prev(ids[4]).unwrap(), extra);
        assert!(!front.contains(ids[2]));
        assert_eq!(front.record(extra).unwrap().row, 1);
    }

    #[test]
    fn split_and_join_keep_every_node_once() {
        let mut store = FrontStore::new(Capacity::for_boundary(16));
        let ids = ring(&mut store, 8);
        let mut front = Front::new();
        let lp = front.add_loop(&ids, false, 0).unwrap();

        let other = front
            .split_loop_at_bridge(lp, ids[1], ids[2], ids[5], ids[6])
            .unwrap();
        assert_eq!(front.loop_nodes(lp).unwrap().len(), 4);
        assert_eq!(front.loop_nodes(other).unwrap(), vec![ids[2], ids[3], ids[4], ids[5]]);
        assert_eq!(front.next(ids[1]).unwrap(), ids[6]);

        front
            .join_loops_at_bridge(lp, ids[1], ids[6], other, ids[5], ids[2])
            .unwrap();
        assert_eq!(front.loop_nodes(lp).unwrap().len(), 8);
        assert!(!front.perimeter(other).unwrap().active);
        assert_eq!(front.node_count(), 8);
    }

    #[test]
    fn joining_redirects_siblings() {
        let mut store = FrontStore::new(Capacity::for_boundary(24));
        let outer = ring(&mut store, 8);
        let first = ring(&mut store, 4);
        let second = ring(&mut store, 4);
        let mut front = Front::new();
        let a = front.add_loop(&outer, false, 0).unwrap();
        let b = front.add_loop(&first, true, 0).unwrap();
        let c = front.add_loop(&second, true, 0).unwrap();
        front.set_sibling(b, Some(a)).unwrap();
        front.set_sibling(c, Some(b)).unwrap();
        assert!(front.are_siblings(a, b));
        assert!(front.are_siblings(b, a));
        assert!(!front.are_siblings(a, c));

        front
            .join_loops_at_bridge(a, outer[0], outer[1], b, first[0], first[1])
            .unwrap();
        assert!(front.are_siblings(a, c));
        assert!(!front.perimeter(a).unwrap().hole);
        assert!(front.perimeter(c).unwrap().hole);
    }

    #[test]
    fn whole_loop_replacement_becomes_new_loop() {
        let mut store = FrontStore::new(Capacity::for_boundary(16));
        let ids = ring(&mut store, 4);
        let fresh = ring(&mut store, 4);
        let mut front = Front::new();
        let lp = front.add_loop(&ids, true, 0).unwrap();
        front.replace_span(lp, ids[0], ids[3], &fresh, 1).unwrap();
        assert_eq!(front.loop_nodes(lp).unwrap(), fresh);
        let retired = front.retire_loop(lp).unwrap();
        assert_eq!(retired.len(), 4);
        assert_eq!(front.node_count(), 0);
    }
}
