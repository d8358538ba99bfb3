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

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::{
    error::{PaveError, PaveResult},
    geometry::Point2,
    mesh::{
        arena::Arena,
        basic_types::{
            Capacity, Handle, Line, LineId, Node, NodeId, PlannedNode, Quad, QuadId, Table,
        },
    },
};

/// Node / line / quad adjacency for one mesh generation.
///
/// Every operator reads and writes topology through these primitives; none of
/// them leaves a line pointing at a removed node or a line with more than two
/// quads.
#[derive(Debug, Clone)]
pub struct FrontStore {
    nodes: Arena<NodeId, Node>,
    lines: Arena<LineId, Line>,
    quads: Arena<QuadId, Quad>,
}

impl FrontStore {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            nodes: Arena::new(Table::Nodes, capacity.nodes),
            lines: Arena::new(Table::Lines, capacity.lines),
            quads: Arena::new(Table::Quads, capacity.quads),
        }
    }

    /// Live `(nodes, lines, quads)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.nodes.len(), self.lines.len(), self.quads.len())
    }

    pub fn capacity(&self) -> Capacity {
        Capacity::new(
            self.nodes.capacity(),
            self.lines.capacity(),
            self.quads.capacity(),
        )
    }

    // ----- lookups ---------------------------------------------------------

    pub fn node(&self, id: NodeId) -> PaveResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| PaveError::geometry(format!("stale node handle {id}")))
    }

    pub fn node_mut(&mut self, id: NodeId) -> PaveResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| PaveError::geometry(format!("stale node handle {id}")))
    }

    pub fn line(&self, id: LineId) -> PaveResult<&Line> {
        self.lines
            .get(id)
            .ok_or_else(|| PaveError::geometry(format!("stale line handle {id}")))
    }

    fn line_mut(&mut self, id: LineId) -> PaveResult<&mut Line> {
        self.lines
            .get_mut(id)
            .ok_or_else(|| PaveError::geometry(format!("stale line handle {id}")))
    }

    pub fn quad(&self, id: QuadId) -> PaveResult<&Quad> {
        self.quads
            .get(id)
            .ok_or_else(|| PaveError::geometry(format!("stale quad handle {id}")))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn position(&self, id: NodeId) -> PaveResult<Point2<f64>> {
        Ok(self.node(id)?.position)
    }

    pub fn set_position(&mut self, id: NodeId, p: Point2<f64>) -> PaveResult<()> {
        self.node_mut(id)?.position = p;
        Ok(())
    }

    pub fn mark_dirty(&mut self, id: NodeId) -> PaveResult<()> {
        self.node_mut(id)?.dirty = true;
        Ok(())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineId, &Line)> + '_ {
        self.lines.iter()
    }

    pub fn quads(&self) -> impl Iterator<Item = (QuadId, &Quad)> + '_ {
        self.quads.iter()
    }

    pub fn quad_positions(&self, id: QuadId) -> PaveResult<[Point2<f64>; 4]> {
        let q = self.quad(id)?;
        Ok([
            self.position(q.nodes[0])?,
            self.position(q.nodes[1])?,
            self.position(q.nodes[2])?,
            self.position(q.nodes[3])?,
        ])
    }

    pub fn incident_lines(&self, n: NodeId) -> PaveResult<&[LineId]> {
        Ok(&self.node(n)?.lines)
    }

    pub fn line_between(&self, a: NodeId, b: NodeId) -> Option<LineId> {
        let node = self.nodes.get(a)?;
        node.lines.iter().copied().find(|&l| {
            self.lines
                .get(l)
                .is_some_and(|line| line.joins(a, b))
        })
    }

    pub fn other_end(&self, line: LineId, n: NodeId) -> PaveResult<NodeId> {
        self.line(line)?
            .other(n)
            .ok_or_else(|| PaveError::geometry(format!("{line} is not incident to {n}")))
    }

    pub fn neighbors(&self, n: NodeId) -> PaveResult<SmallVec<[NodeId; 8]>> {
        let mut out = SmallVec::new();
        for &l in self.incident_lines(n)? {
            out.push(self.other_end(l, n)?);
        }
        Ok(out)
    }

    pub fn quads_around(&self, n: NodeId) -> PaveResult<SmallVec<[QuadId; 8]>> {
        let mut out: SmallVec<[QuadId; 8]> = SmallVec::new();
        for &l in self.incident_lines(n)? {
            for &q in &self.line(l)?.quads {
                if !out.contains(&q) {
                    out.push(q);
                }
            }
        }
        Ok(out)
    }

    /// Quad count of the line joining `a` and `b`, if any.
    pub fn line_quad_count(&self, a: NodeId, b: NodeId) -> Option<usize> {
        let l = self.line_between(a, b)?;
        self.lines.get(l).map(|line| line.quads.len())
    }

    // ----- capacity --------------------------------------------------------

    /// Fails with `CapacityExceeded` unless every table can take the given
    /// number of new entries.
    pub fn reserve(&self, nodes: usize, lines: usize, quads: usize) -> PaveResult<()> {
        self.nodes.check_room(nodes)?;
        self.lines.check_room(lines)?;
        self.quads.check_room(quads)
    }

    /// Number of lines `link_quad` would create for the planned quads.
    pub fn count_new_lines(&self, quads: &[[PlannedNode; 4]]) -> usize {
        let mut seen: AHashSet<(PlannedNode, PlannedNode)> = AHashSet::new();
        let mut count = 0;
        for q in quads {
            for i in 0..4 {
                let (a, b) = (q[i], q[(i + 1) % 4]);
                let key = if key_order(a) <= key_order(b) { (a, b) } else { (b, a) };
                if !seen.insert(key) {
                    continue;
                }
                let exists = match (a, b) {
                    (PlannedNode::Existing(x), PlannedNode::Existing(y)) => {
                        self.line_between(x, y).is_some()
                    }
                    _ => false,
                };
                if !exists {
                    count += 1;
                }
            }
        }
        count
    }

    // ----- mutation --------------------------------------------------------

    pub fn add_node(&mut self, node: Node) -> PaveResult<NodeId> {
        self.nodes.insert(node)
    }

    /// Removes a node with no incident lines.
    pub fn delete_node(&mut self, id: NodeId) -> PaveResult<()> {
        let node = self.node(id)?;
        if !node.lines.is_empty() {
            return Err(PaveError::geometry(format!(
                "{id} still has {} incident lines",
                node.lines.len()
            )));
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// Returns the line joining `a` and `b`, creating it when missing.
    pub fn add_line(&mut self, a: NodeId, b: NodeId) -> PaveResult<LineId> {
        if a == b {
            return Err(PaveError::geometry(format!("line from {a} to itself")));
        }
        self.node(a)?;
        self.node(b)?;
        if let Some(l) = self.line_between(a, b) {
            return Ok(l);
        }
        let id = self.lines.insert(Line {
            nodes: [a, b],
            quads: SmallVec::new(),
        })?;
        self.node_mut(a)?.lines.push(id);
        self.node_mut(b)?.lines.push(id);
        Ok(id)
    }

    /// Removes a line no quad references.
    pub fn delete_line(&mut self, id: LineId) -> PaveResult<()> {
        let line = self.line(id)?;
        if !line.quads.is_empty() {
            return Err(PaveError::geometry(format!(
                "{id} still bounds {} quads",
                line.quads.len()
            )));
        }
        let [a, b] = line.nodes;
        for n in [a, b] {
            self.node_mut(n)?.lines.retain(|l| *l != id);
        }
        self.lines.remove(id);
        Ok(())
    }

    /// Creates a quad over four existing nodes, reusing existing lines.
    pub fn link_quad(&mut self, nodes: [NodeId; 4]) -> PaveResult<QuadId> {
        for i in 0..4 {
            self.node(nodes[i])?;
            for j in (i + 1)..4 {
                if nodes[i] == nodes[j] {
                    return Err(PaveError::geometry(format!(
                        "quad repeats node {}",
                        nodes[i]
                    )));
                }
            }
        }
        for i in 0..4 {
            if let Some(count) = self.line_quad_count(nodes[i], nodes[(i + 1) % 4]) {
                if count >= 2 {
                    return Err(PaveError::geometry(format!(
                        "line {}-{} already bounds two quads",
                        nodes[i],
                        nodes[(i + 1) % 4]
                    )));
                }
            }
        }
        let planned = [nodes.map(PlannedNode::Existing)];
        self.reserve(0, self.count_new_lines(&planned), 1)?;

        let lines = [
            self.add_line(nodes[0], nodes[1])?,
            self.add_line(nodes[1], nodes[2])?,
            self.add_line(nodes[2], nodes[3])?,
            self.add_line(nodes[3], nodes[0])?,
        ];
        let id = self.quads.insert(Quad { nodes, lines })?;
        for l in lines {
            self.line_mut(l)?.quads.push(id);
        }
        Ok(id)
    }

    /// Moves every line and quad reference from `from` onto `to`. `from`
    /// ends with no incident lines.
    pub fn retarget_node(&mut self, from: NodeId, to: NodeId) -> PaveResult<()> {
        if from == to {
            return Ok(());
        }
        let moved: SmallVec<[LineId; 8]> = self.node(from)?.lines.clone();
        for &l in &moved {
            let other = self.other_end(l, from)?;
            if other == to {
                return Err(PaveError::geometry(format!(
                    "retargeting {from} onto {to} collapses {l}"
                )));
            }
            if self.line_between(other, to).is_some() {
                return Err(PaveError::geometry(format!(
                    "retargeting {from} onto {to} duplicates a line at {other}"
                )));
            }
        }
        let quads = self.quads_around(from)?;
        for &l in &moved {
            let line = self.line_mut(l)?;
            for end in line.nodes.iter_mut() {
                if *end == from {
                    *end = to;
                }
            }
        }
        for q in quads {
            if let Some(quad) = self.quads.get_mut(q) {
                for n in quad.nodes.iter_mut() {
                    if *n == from {
                        *n = to;
                    }
                }
            }
        }
        self.node_mut(from)?.lines.clear();
        self.node_mut(to)?.lines.extend(moved);
        Ok(())
    }

    /// Hands every quad of `drop` over to `keep` and deletes `drop`.
    pub fn merge_lines(&mut self, keep: LineId, drop: LineId) -> PaveResult<()> {
        if keep == drop {
            return Ok(());
        }
        let moving: SmallVec<[QuadId; 2]> = self.line(drop)?.quads.clone();
        if self.line(keep)?.quads.len() + moving.len() > 2 {
            return Err(PaveError::geometry(format!(
                "merging {drop} into {keep} exceeds two quads"
            )));
        }
        for &q in &moving {
            if let Some(quad) = self.quads.get_mut(q) {
                for l in quad.lines.iter_mut() {
                    if *l == drop {
                        *l = keep;
                    }
                }
            }
        }
        self.line_mut(drop)?.quads.clear();
        self.line_mut(keep)?.quads.extend(moving);
        self.delete_line(drop)
    }

    /// Checks the topology invariants: at most two quads per line, no
    /// reference to a removed entry, symmetric node/line incidence and
    /// quads whose lines join their consecutive corners.
    pub fn validate(&self) -> PaveResult<()> {
        for (lid, line) in self.lines.iter() {
            if line.quads.len() > 2 {
                return Err(PaveError::geometry(format!(
                    "{lid} bounds {} quads",
                    line.quads.len()
                )));
            }
            for n in line.nodes {
                let node = self
                    .nodes
                    .get(n)
                    .ok_or_else(|| PaveError::geometry(format!("{lid} references removed {n}")))?;
                if !node.lines.contains(&lid) {
                    return Err(PaveError::geometry(format!("{n} does not list {lid}")));
                }
            }
            for &q in &line.quads {
                let quad = self
                    .quads
                    .get(q)
                    .ok_or_else(|| PaveError::geometry(format!("{lid} references removed {q}")))?;
                if !quad.lines.contains(&lid) {
                    return Err(PaveError::geometry(format!("{q} does not list {lid}")));
                }
            }
        }
        for (nid, node) in self.nodes.iter() {
            for &l in &node.lines {
                let line = self
                    .lines
                    .get(l)
                    .ok_or_else(|| PaveError::geometry(format!("{nid} references removed {l}")))?;
                if !line.nodes.contains(&nid) {
                    return Err(PaveError::geometry(format!("{l} does not touch {nid}")));
                }
            }
        }
        for (qid, quad) in self.quads.iter() {
            for i in 0..4 {
                let line = self
                    .lines
                    .get(quad.lines[i])
                    .ok_or_else(|| PaveError::geometry(format!("{qid} references a removed line")))?;
                if !line.joins(quad.nodes[i], quad.nodes[(i + 1) % 4]) {
                    return Err(PaveError::geometry(format!(
                        "{qid} side {i} does not match its line"
                    )));
                }
                if !line.quads.contains(&qid) {
                    return Err(PaveError::geometry(format!(
                        "{} does not list {qid}",
                        quad.lines[i]
                    )));
                }
            }
        }
        Ok(())
    }
}

fn key_order(n: PlannedNode) -> (u8, usize, u32) {
    match n {
        PlannedNode::Existing(id) => (0, id.index(), id.generation()),
        PlannedNode::New(i) => (1, i, 0),
    }
}
