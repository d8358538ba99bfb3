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

//! Boundary description handed to the mesher.

use tracing::debug;

use crate::{
    error::{PaveError, PaveResult},
    geometry::{Point2, util::polygon_signed_area},
    mesh::{Capacity, FrontStore, Node},
    paving::front::Front,
};

/// Target element size along the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SizeHint {
    /// Mean boundary edge length of each loop.
    #[default]
    Auto,
    Uniform(f64),
    /// One value per loop, in loop order.
    PerLoop(Vec<f64>),
    /// One value per entry of the point table.
    PerNode(Vec<f64>),
}

/// Closed boundary loops over a shared point table.
///
/// The first loop is the outer boundary, the others are holes. Each loop must
/// have an even number of nodes; orientation is fixed up on load.
#[derive(Debug, Clone, Default)]
pub struct BoundaryInput {
    pub points: Vec<Point2<f64>>,
    pub loops: Vec<Vec<usize>>,
    pub sizes: SizeHint,
}

impl BoundaryInput {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            loops: Vec::new(),
            sizes: SizeHint::Auto,
        }
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&p| Point2::from(p)).collect())
    }

    /// Adds a loop over existing point indices.
    #[must_use]
    pub fn with_loop(mut self, indices: Vec<usize>) -> Self {
        self.loops.push(indices);
        self
    }

    /// Appends `ring` to the point table and adds it as a loop.
    #[must_use]
    pub fn with_ring(mut self, ring: Vec<Point2<f64>>) -> Self {
        let start = self.points.len();
        let indices = (start..start + ring.len()).collect();
        self.points.extend(ring);
        self.loops.push(indices);
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, sizes: SizeHint) -> Self {
        self.sizes = sizes;
        self
    }

    /// Nodes referenced by all loops.
    pub fn node_count(&self) -> usize {
        self.loops.iter().map(Vec::len).sum()
    }

    /// Rejects inputs no mesh can be built from. Runs before anything is
    /// allocated.
    pub fn validate(&self) -> PaveResult<()> {
        if self.loops.is_empty() {
            return Err(PaveError::degenerate("no boundary loops"));
        }
        if let Some(i) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(PaveError::degenerate(format!("point {i} is not finite")));
        }
        let mut seen = vec![false; self.points.len()];
        for (li, lp) in self.loops.iter().enumerate() {
            if lp.len() < 2 {
                return Err(PaveError::degenerate(format!("loop {li} has fewer than two nodes")));
            }
            if lp.len() % 2 != 0 {
                return Err(PaveError::degenerate(format!(
                    "loop {li} has an odd node count ({})",
                    lp.len()
                )));
            }
            for &i in lp {
                let slot = seen.get_mut(i).ok_or_else(|| {
                    PaveError::degenerate(format!("loop {li} references missing point {i}"))
                })?;
                if *slot {
                    return Err(PaveError::degenerate(format!("point {i} appears twice")));
                }
                *slot = true;
            }
        }
        match &self.sizes {
            SizeHint::Auto => {}
            SizeHint::Uniform(s) => check_size(*s)?,
            SizeHint::PerLoop(v) => {
                if v.len() != self.loops.len() {
                    return Err(PaveError::degenerate("one size per loop expected"));
                }
                v.iter().try_for_each(|s| check_size(*s))?;
            }
            SizeHint::PerNode(v) => {
                if v.len() != self.points.len() {
                    return Err(PaveError::degenerate("one size per point expected"));
                }
                for lp in &self.loops {
                    lp.iter().try_for_each(|&i| check_size(v[i]))?;
                }
            }
        }
        Ok(())
    }

    fn size_of(&self, loop_index: usize, point: usize, auto: f64) -> f64 {
        match &self.sizes {
            SizeHint::Auto => auto,
            SizeHint::Uniform(s) => *s,
            SizeHint::PerLoop(v) => v.get(loop_index).copied().unwrap_or(auto),
            SizeHint::PerNode(v) => v.get(point).copied().unwrap_or(auto),
        }
    }

    /// Builds the store and the initial front. The outer loop is turned
    /// counter-clockwise and holes clockwise.
    pub(crate) fn load(&self, capacity: Capacity) -> PaveResult<(FrontStore, Front)> {
        self.validate()?;
        let mut store = FrontStore::new(capacity);
        let lines = self
            .loops
            .iter()
            .map(|lp| if lp.len() == 2 { 1 } else { lp.len() })
            .sum();
        store.reserve(self.node_count(), lines, 0)?;

        let mut front = Front::new();
        for (li, lp) in self.loops.iter().enumerate() {
            let ring: Vec<Point2<f64>> = lp.iter().map(|&i| self.points[i]).collect();
            let area = polygon_signed_area(&ring);
            let hole = li > 0;
            let mut order = lp.clone();
            if (hole && area > 0.0) || (!hole && area < 0.0) {
                order[1..].reverse();
            }
            let perimeter: f64 = (0..ring.len())
                .map(|i| ring[i].distance_to(&ring[(i + 1) % ring.len()]))
                .sum();
            let auto = perimeter / ring.len() as f64;
            if auto <= 0.0 {
                return Err(PaveError::geometry_in(li, "loop has zero length"));
            }

            let mut ids = Vec::with_capacity(order.len());
            for &i in &order {
                let mut node = Node::new(self.points[i], self.size_of(li, i, auto));
                node.fixed = true;
                node.source = Some(i);
                ids.push(store.add_node(node)?);
            }
            for k in 0..ids.len() {
                store.add_line(ids[k], ids[(k + 1) % ids.len()])?;
            }
            let id = front.add_loop(&ids, hole, 0)?;
            if hole {
                front.set_sibling(id, Some(0))?;
            }
            debug!(loop_id = id, nodes = ids.len(), hole, area, "boundary loop loaded");
        }
        Ok((store, front))
    }
}

fn check_size(s: f64) -> PaveResult<()> {
    if s.is_finite() && s > 0.0 {
        Ok(())
    } else {
        Err(PaveError::geometry(format!("size hint {s} must be positive")))
    }
}

/// Counter-clockwise boundary of an axis-aligned rectangle with `nx` edges
/// along x and `ny` along y, starting at `(x0, y0)`.
pub fn rectangle_ring(
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
    nx: usize,
    ny: usize,
) -> Vec<Point2<f64>> {
    let (dx, dy) = (width / nx as f64, height / ny as f64);
    let mut ring = Vec::with_capacity(2 * (nx + ny));
    for i in 0..nx {
        ring.push(Point2::new(x0 + dx * i as f64, y0));
    }
    for j in 0..ny {
        ring.push(Point2::new(x0 + width, y0 + dy * j as f64));
    }
    for i in 0..nx {
        ring.push(Point2::new(x0 + width - dx * i as f64, y0 + height));
    }
    for j in 0..ny {
        ring.push(Point2::new(x0, y0 + height - dy * j as f64));
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_loop_is_degenerate() {
        let input = BoundaryInput::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])
            .with_loop(vec![0, 1, 2]);
        assert!(matches!(input.validate(), Err(PaveError::DegenerateInput(_))));
    }

    #[test]
    fn shared_point_is_degenerate() {
        let input = BoundaryInput::new(rectangle_ring(0.0, 0.0, 1.0, 1.0, 1, 1))
            .with_loop(vec![0, 1, 2, 3])
            .with_loop(vec![3, 2]);
        assert!(matches!(input.validate(), Err(PaveError::DegenerateInput(_))));
    }

    #[test]
    fn non_positive_size_is_a_geometry_error() {
        let input = BoundaryInput::default()
            .with_ring(rectangle_ring(0.0, 0.0, 1.0, 1.0, 1, 1))
            .with_sizes(SizeHint::Uniform(0.0));
        assert!(matches!(input.validate(), Err(PaveError::Geometry { .. })));
    }

    #[test]
    fn clockwise_outer_loop_is_reoriented() {
        let mut ring = rectangle_ring(0.0, 0.0, 2.0, 1.0, 2, 1);
        ring.reverse();
        let input = BoundaryInput::default().with_ring(ring);
        let (store, front) = input.load(Capacity::for_boundary(6)).unwrap();
        assert!(front.signed_area(0, &store).unwrap() > 0.0);
        assert_eq!(store.counts(), (6, 6, 0));
    }
}
