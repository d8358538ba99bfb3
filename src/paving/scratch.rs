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

//! Reusable buffers threaded through the operators of one paving run.

use crate::{
    mesh::NodeId,
    paving::{
        front::{AngleStatus, FrontEdge, NodeKind},
        row::RowCandidate,
    },
};

/// Working memory for the paving operators.
///
/// Each operator owns its own field so an operator may call another one
/// (a row calling pinch, pinch calling wedge) without clobbering buffers it
/// still reads.
#[derive(Debug, Default)]
pub struct Scratch {
    pub(crate) classify: ClassifyBuffers,
    pub(crate) row: RowBuffers,
    pub(crate) pinch: Vec<NodeId>,
    pub(crate) relax: Vec<NodeId>,
    /// Snapshot of every active front edge; refreshed by whoever reads it.
    pub(crate) edges: Vec<FrontEdge>,
}

#[derive(Debug, Default)]
pub(crate) struct ClassifyBuffers {
    pub nodes: Vec<NodeId>,
    pub angles: Vec<f64>,
    pub kinds: Vec<NodeKind>,
    pub status: Vec<AngleStatus>,
    pub distance: Vec<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct RowBuffers {
    pub nodes: Vec<NodeId>,
    pub candidates: Vec<RowCandidate>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers pre-sized for fronts of about `front_len` nodes.
    pub fn with_front_len(front_len: usize) -> Self {
        let mut s = Self::default();
        s.classify.nodes.reserve(front_len);
        s.classify.angles.reserve(front_len);
        s.classify.kinds.reserve(front_len);
        s.classify.status.reserve(front_len);
        s.classify.distance.reserve(front_len);
        s.row.nodes.reserve(front_len);
        s.pinch.reserve(front_len);
        s.edges.reserve(front_len);
        s
    }
}
