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

use std::fmt;

use smallvec::SmallVec;

use crate::geometry::Point2;

/// Typed, generation-checked handle into one of the store's arenas.
pub trait Handle: Copy + Eq + fmt::Debug {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

macro_rules! handle {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl Handle for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            #[inline]
            fn index(self) -> usize {
                self.index as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}v{})", stringify!($name), self.index, self.generation)
            }
        }
    };
}

handle!(NodeId);
handle!(LineId);
handle!(QuadId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Nodes,
    Lines,
    Quads,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Nodes => "node",
            Table::Lines => "line",
            Table::Quads => "quad",
        })
    }
}

/// Table sizes for one mesh generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub nodes: usize,
    pub lines: usize,
    pub quads: usize,
}

impl Capacity {
    pub const fn new(nodes: usize, lines: usize, quads: usize) -> Self {
        Self {
            nodes,
            lines,
            quads,
        }
    }

    /// Generous estimate for a boundary of `n` nodes meshed at roughly its
    /// own edge length.
    pub fn for_boundary(n: usize) -> Self {
        let quads = n * n / 4 + 4 * n + 32;
        let nodes = n + quads + 32;
        let lines = nodes + quads + 32;
        Self::new(nodes, lines, quads)
    }

    pub fn of(&self, table: Table) -> usize {
        match table {
            Table::Nodes => self.nodes,
            Table::Lines => self.lines,
            Table::Quads => self.quads,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub position: Point2<f64>,
    /// Target element size near this node.
    pub size: f64,
    pub lines: SmallVec<[LineId; 8]>,
    /// Caller-supplied boundary node: never moved, never merged away.
    pub fixed: bool,
    /// Pending relaxation.
    pub dirty: bool,
    /// Index in the caller's point table, for input nodes.
    pub source: Option<usize>,
}

impl Node {
    pub fn new(position: Point2<f64>, size: f64) -> Self {
        Self {
            position,
            size,
            lines: SmallVec::new(),
            fixed: false,
            dirty: false,
            source: None,
        }
    }
}

/// Undirected edge; `quads` never holds more than two entries.
#[derive(Debug, Clone)]
pub struct Line {
    pub nodes: [NodeId; 2],
    pub quads: SmallVec<[QuadId; 2]>,
}

impl Line {
    pub fn other(&self, n: NodeId) -> Option<NodeId> {
        if self.nodes[0] == n {
            Some(self.nodes[1])
        } else if self.nodes[1] == n {
            Some(self.nodes[0])
        } else {
            None
        }
    }

    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.nodes[0] == a && self.nodes[1] == b) || (self.nodes[0] == b && self.nodes[1] == a)
    }
}

/// Four nodes counter-clockwise; `lines[i]` joins `nodes[i]` and `nodes[i + 1]`.
#[derive(Debug, Clone)]
pub struct Quad {
    pub nodes: [NodeId; 4],
    pub lines: [LineId; 4],
}

/// A quad corner in an operator plan: an existing node or the i-th node the
/// plan will create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannedNode {
    Existing(NodeId),
    New(usize),
}

impl PlannedNode {
    pub fn resolve(self, created: &[NodeId]) -> Option<NodeId> {
        match self {
            PlannedNode::Existing(id) => Some(id),
            PlannedNode::New(i) => created.get(i).copied(),
        }
    }
}

impl From<NodeId> for PlannedNode {
    fn from(id: NodeId) -> Self {
        PlannedNode::Existing(id)
    }
}
