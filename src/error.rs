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

//! Error types for the paving mesher.

use thiserror::Error;

use crate::mesh::basic_types::Table;

/// The three ways a mesh generation can fail.
///
/// Operators that merely do not apply (a pinch that would invert a quad, a
/// bridge with no candidate) report typed outcomes instead; a `PaveError`
/// always aborts the whole generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaveError {
    /// A loop cannot be classified, advanced or closed safely.
    #[error("geometry error (loop {loop_id:?}): {reason}")]
    Geometry {
        /// Loop the failure was detected on, when known.
        loop_id: Option<usize>,
        /// Human-readable cause.
        reason: String,
    },

    /// A node, line or quad table is full.
    #[error("capacity exceeded: {table} table holds at most {capacity} entries")]
    CapacityExceeded {
        /// The exhausted table.
        table: Table,
        /// Its configured capacity.
        capacity: usize,
    },

    /// The input was rejected before any mutation.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

impl PaveError {
    #[must_use]
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::Geometry {
            loop_id: None,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn geometry_in(loop_id: usize, reason: impl Into<String>) -> Self {
        Self::Geometry {
            loop_id: Some(loop_id),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn capacity(table: Table, capacity: usize) -> Self {
        Self::CapacityExceeded { table, capacity }
    }

    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput(reason.into())
    }

    /// Attaches `loop_id` to a geometry error that does not name a loop yet.
    #[must_use]
    pub fn on_loop(self, loop_id: usize) -> Self {
        match self {
            Self::Geometry {
                loop_id: None,
                reason,
            } => Self::Geometry {
                loop_id: Some(loop_id),
                reason,
            },
            other => other,
        }
    }

    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

/// Result alias used across the crate.
pub type PaveResult<T> = Result<T, PaveError>;
