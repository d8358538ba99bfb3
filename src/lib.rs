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

//! Advancing-front all-quadrilateral paving.
//!
//! A region bounded by one outer loop and any number of hole loops, each with
//! an even number of nodes, is filled with convex quadrilaterals by laying
//! rows of elements inward from the boundary until every loop closes.

pub mod error;
pub mod geometry;
pub mod kernel;
pub mod mesh;
pub mod numeric;
pub mod paving;

pub use error::{PaveError, PaveResult};
pub use geometry::{Point2, Segment2, Vector2};
pub use mesh::{Capacity, FrontStore, LineId, NodeId, QuadId, Table};
pub use paving::{
    BoundaryInput, Front, PaveParams, PaveStats, Paver, QuadMesh, Scratch, SizeHint, pave,
    rectangle_ring,
};
