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

//! Wedge insertion: splits a long front edge next to a short one.

use tracing::{debug, trace};

use crate::{
    error::PaveResult,
    geometry::{Point2, Segment2, util::{interior_angle, quad_is_acceptable}},
    mesh::{Node, NodeId, PlannedNode},
    paving::{
        driver::Paver,
        front::{ProbeSegment, region_clear, segments_clear},
        row::{CLEARANCE, resolve_quad},
        scratch::Scratch,
    },
};

use PlannedNode::{Existing, New};

impl Paver<'_> {
    /// Adds a square on the short edge at front node `n` and a trapezoid on
    /// the long one, replacing `n` on the front by three new nodes.
    /// Returns `Ok(false)` when the edges are balanced or the quads do not fit.
    pub fn insert_wedge(&mut self, n: NodeId, scratch: &mut Scratch) -> PaveResult<bool> {
        let Some(rec) = self.front.get(n) else {
            return Ok(false);
        };
        let (lp, p, q, row) = (rec.lp, rec.prev, rec.next, rec.row);
        if self.front.perimeter(lp)?.len < 4 || p == q {
            return Ok(false);
        }
        let (pp, pn, pq) = (self.store.position(p)?, self.store.position(n)?, self.store.position(q)?);
        let (back, ahead) = (pp.distance_to(&pn), pn.distance_to(&pq));
        let short = back.min(ahead);
        if short <= 0.0 || back.max(ahead) / short <= self.params.wedge_ratio {
            return Ok(false);
        }
        let Some(theta) = interior_angle(&pp, &pn, &pq) else {
            return Ok(false);
        };
        let (Some(to_next), Some(from_prev)) = ((pq - pn).normalized(), (pn - pp).normalized()) else {
            return Ok(false);
        };
        let apex = pn + to_next.rotate(0.5 * theta).scale(short / (0.5 * theta).sin().max(0.5));

        // new nodes listed in front order between p and q
        let (positions, quads): ([Point2<f64>; 3], [[PlannedNode; 4]; 2]) = if ahead > back {
            let x = pp + from_prev.perp_left().scale(short);
            let b = pn.midpoint(&pq) + to_next.perp_left().scale(short);
            (
                [x, apex, b],
                [
                    [Existing(p), Existing(n), New(1), New(0)],
                    [Existing(n), Existing(q), New(2), New(1)],
                ],
            )
        } else {
            let y = pq + to_next.perp_left().scale(short);
            let b = pp.midpoint(&pn) + from_prev.perp_left().scale(short);
            (
                [b, apex, y],
                [
                    [Existing(n), Existing(q), New(2), New(1)],
                    [Existing(p), Existing(n), New(1), New(0)],
                ],
            )
        };

        let locate = |planned: PlannedNode| -> PaveResult<Point2<f64>> {
            match planned {
                Existing(id) => self.store.position(id),
                New(i) => Ok(positions[i]),
            }
        };
        let mut pts = Vec::with_capacity(2);
        for quad in &quads {
            let corners = [locate(quad[0])?, locate(quad[1])?, locate(quad[2])?, locate(quad[3])?];
            if !quad_is_acceptable(&corners, self.params.min_element_angle, self.params.max_element_angle) {
                trace!(node = %n, "wedge quads out of bounds");
                return Ok(false);
            }
            pts.push(corners);
        }
        let probes: [ProbeSegment; 4] = [
            (Segment2::new(pp, positions[0]), [Some(p), None]),
            (Segment2::new(positions[0], positions[1]), [None, None]),
            (Segment2::new(positions[1], positions[2]), [None, None]),
            (Segment2::new(positions[2], pq), [None, Some(q)]),
        ];
        self.front.edges(&self.store, &mut scratch.edges)?;
        let ignore = [p, n, q];
        if !segments_clear(&scratch.edges, &probes, &ignore, CLEARANCE * short)
            || !region_clear(&scratch.edges, &pts, &ignore)
        {
            trace!(node = %n, "wedge would cross the front");
            return Ok(false);
        }

        let lines = self.store.count_new_lines(&quads);
        self.store.reserve(3, lines, 2)?;
        let size = self.store.node(n)?.size;
        let mut created = Vec::with_capacity(3);
        for pos in positions {
            let mut node = Node::new(pos, size);
            node.dirty = true;
            created.push(self.store.add_node(node)?);
        }
        for quad in &quads {
            self.store.link_quad(resolve_quad(quad, &created)?)?;
        }
        self.front.replace_span(lp, n, n, &created, row + 1)?;
        self.store.mark_dirty(p)?;
        self.store.mark_dirty(q)?;
        self.stats.wedges += 1;
        self.update_angles(lp)?;
        debug!(loop_id = lp, node = %n, ratio = back.max(ahead) / short, "wedge inserted");
        Ok(true)
    }
}
