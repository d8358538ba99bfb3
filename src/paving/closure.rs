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

//! Direct closure of loops with two, four or six nodes.

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    error::PaveResult,
    geometry::{
        Point2, Segment2,
        util::{
            polygon_centroid, quad_angle_range, quad_is_acceptable, quad_is_convex,
            quad_signed_area,
        },
    },
    kernel::{Orientation, orient2d_sign, point_in_convex},
    mesh::{Node, NodeId, PlannedNode},
    paving::{
        driver::Paver,
        front::{FrontEdge, ProbeSegment, region_clear, segments_clear},
        row::{CLEARANCE, resolve_quad},
        scratch::Scratch,
    },
};

use PlannedNode::{Existing, New};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Acceptable,
    Convex,
    Positive,
}

/// Splits beat centroid fans within a tier; larger minimum angle wins ties.
#[derive(Debug, Clone, Copy)]
struct Rank {
    tier: Tier,
    centroid: bool,
    score: f64,
}

impl Rank {
    fn beats(&self, other: &Rank) -> bool {
        match (self.tier, self.centroid).cmp(&(other.tier, other.centroid)) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.score > other.score,
        }
    }
}

fn offer(best: &mut Option<(Rank, ClosurePlan)>, rank: Rank, plan: ClosurePlan) {
    if best.as_ref().is_none_or(|(b, _)| rank.beats(b)) {
        *best = Some((rank, plan));
    }
}

#[derive(Debug)]
struct ClosurePlan {
    quads: SmallVec<[[PlannedNode; 4]; 3]>,
    centroid: Option<Point2<f64>>,
}

impl Paver<'_> {
    /// Closes a loop of two, four or six nodes. Returns `Ok(false)` for any
    /// other size, for loops around a hole, and when no split fits.
    pub fn close_small_loop(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        let nodes = self.front.loop_nodes(lp)?;
        if nodes.len() == 2 {
            self.front.retire_loop(lp)?;
            self.stats.closures += 1;
            debug!(loop_id = lp, "two-node loop retired");
            return Ok(true);
        }
        if nodes.len() != 4 && nodes.len() != 6 {
            return Ok(false);
        }
        if self.front.signed_area(lp, &self.store)? <= 0.0 {
            return Ok(false);
        }
        self.front.edges(&self.store, &mut scratch.edges)?;
        let mut pts = Vec::with_capacity(nodes.len());
        for &n in &nodes {
            pts.push(self.store.position(n)?);
        }

        let plan = if nodes.len() == 4 {
            let quad = [pts[0], pts[1], pts[2], pts[3]];
            (quad_signed_area(&quad) > 0.0 && region_clear(&scratch.edges, &[quad], &nodes)).then(|| {
                ClosurePlan {
                    quads: SmallVec::from_slice(&[nodes_quad(&nodes, [0, 1, 2, 3])]),
                    centroid: None,
                }
            })
        } else {
            self.best_six_split(&nodes, &pts, &scratch.edges)?
        };
        let Some(plan) = plan else {
            return Ok(false);
        };
        self.commit_closure(lp, &nodes, plan)?;
        Ok(true)
    }

    fn best_six_split(
        &self,
        nodes: &[NodeId],
        pts: &[Point2<f64>],
        edges: &[FrontEdge],
    ) -> PaveResult<Option<ClosurePlan>> {
        let limits = self.params.relaxed();
        let grade = |quads: &[[Point2<f64>; 4]]| -> Option<(Tier, f64)> {
            if !region_clear(edges, quads, nodes) {
                return None;
            }
            let score = quads
                .iter()
                .map(|q| quad_angle_range(q).0)
                .fold(f64::INFINITY, f64::min);
            let tier = if quads
                .iter()
                .all(|q| quad_is_acceptable(q, limits.min_element_angle, limits.max_element_angle))
            {
                Tier::Acceptable
            } else if quads.iter().all(quad_is_convex) {
                Tier::Convex
            } else if quads.iter().all(|q| quad_signed_area(q) > 0.0) {
                Tier::Positive
            } else {
                return None;
            };
            Some((tier, score))
        };

        let mut best: Option<(Rank, ClosurePlan)> = None;
        for i in 0..3 {
            if self.store.line_between(nodes[i], nodes[i + 3]).is_some() {
                continue;
            }
            let a = [i, i + 1, i + 2, i + 3];
            let b = [i + 3, (i + 4) % 6, (i + 5) % 6, i];
            let quads = [a.map(|k| pts[k]), b.map(|k| pts[k])];
            if let Some((tier, score)) = grade(&quads) {
                offer(
                    &mut best,
                    Rank { tier, centroid: false, score },
                    ClosurePlan {
                        quads: SmallVec::from_slice(&[nodes_quad(nodes, a), nodes_quad(nodes, b)]),
                        centroid: None,
                    },
                );
            }
        }

        let Some(c) = Point2::centroid(pts.iter().copied()) else {
            return Ok(best.map(|(_, p)| p));
        };
        for r in 0..2 {
            let corners = [r, r + 2, (r + 4) % 6];
            let quads = corners.map(|k| [pts[k], pts[(k + 1) % 6], pts[(k + 2) % 6], c]);
            if let Some((tier, score)) = grade(&quads) {
                let planned = corners.map(|k| {
                    [Existing(nodes[k]), Existing(nodes[(k + 1) % 6]), Existing(nodes[(k + 2) % 6]), New(0)]
                });
                offer(
                    &mut best,
                    Rank { tier, centroid: true, score },
                    ClosurePlan {
                        quads: SmallVec::from_slice(&planned),
                        centroid: Some(c),
                    },
                );
            }
        }
        Ok(best.map(|(_, p)| p))
    }

    /// Closes a loop of any even size with a fan of quads around one new
    /// node at its centroid. Applies only when that node sees every front
    /// edge of the loop and no other front node lies inside the fan.
    pub fn close_with_fan(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        let nodes = self.front.loop_nodes(lp)?;
        let n = nodes.len();
        if n < 4 || n % 2 != 0 {
            return Ok(false);
        }
        let mut pts = Vec::with_capacity(n);
        for &id in &nodes {
            pts.push(self.store.position(id)?);
        }
        let sees_every_edge = |c: &Point2<f64>| {
            (0..n).all(|i| orient2d_sign(&pts[i], &pts[(i + 1) % n], c) == Orientation::CounterClockwise)
        };
        let centre = [polygon_centroid(&pts), Point2::centroid(pts.iter().copied())]
            .into_iter()
            .flatten()
            .find(|c| sees_every_edge(c));
        let Some(c) = centre else {
            return Ok(false);
        };

        self.front.edges(&self.store, &mut scratch.edges)?;
        let covered = scratch.edges.iter().filter(|e| e.lp != lp).any(|e| {
            (0..n).any(|i| point_in_convex(&e.seg.a, &[c, pts[i], pts[(i + 1) % n]]))
        });
        let spokes: Vec<ProbeSegment> = (0..n)
            .map(|i| (Segment2::new(pts[i], c), [Some(nodes[i]), None]))
            .collect();
        let reach = spokes.iter().map(|(s, _)| s.length()).sum::<f64>() / n as f64;
        if covered || !segments_clear(&scratch.edges, &spokes, &nodes, CLEARANCE * reach) {
            return Ok(false);
        }

        let mut best: Option<(f64, usize)> = None;
        for r in 0..2 {
            let score = (0..n / 2)
                .map(|k| {
                    let i = r + 2 * k;
                    quad_angle_range(&[pts[i % n], pts[(i + 1) % n], pts[(i + 2) % n], c]).0
                })
                .fold(f64::INFINITY, f64::min);
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, r));
            }
        }
        let Some((score, r)) = best else {
            return Ok(false);
        };
        let quads = (0..n / 2)
            .map(|k| {
                let i = r + 2 * k;
                [
                    Existing(nodes[i % n]),
                    Existing(nodes[(i + 1) % n]),
                    Existing(nodes[(i + 2) % n]),
                    New(0),
                ]
            })
            .collect();
        debug!(loop_id = lp, nodes = n, min_angle = score.to_degrees(), "fan closure");
        self.commit_closure(lp, &nodes, ClosurePlan { quads, centroid: Some(c) })?;
        Ok(true)
    }

    /// Cuts the best quad of four consecutive front nodes off loop `lp`,
    /// shrinking it by two. Any quad inside the loosest element window is
    /// accepted.
    pub fn cut_ear(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<bool> {
        let nodes = self.front.loop_nodes(lp)?;
        let n = nodes.len();
        if n < 6 {
            return Ok(false);
        }
        let limits = self.params.loosest();
        self.front.edges(&self.store, &mut scratch.edges)?;
        let mut best: Option<(f64, usize)> = None;
        for i in 0..n {
            let ids = [nodes[i], nodes[(i + 1) % n], nodes[(i + 2) % n], nodes[(i + 3) % n]];
            if self.store.line_between(ids[3], ids[0]).is_some() {
                continue;
            }
            let quad = [
                self.store.position(ids[0])?,
                self.store.position(ids[1])?,
                self.store.position(ids[2])?,
                self.store.position(ids[3])?,
            ];
            if !quad_is_acceptable(&quad, limits.min_element_angle, limits.max_element_angle) {
                continue;
            }
            let chord = Segment2::new(quad[3], quad[0]);
            let tol = CLEARANCE * chord.length();
            let probe = [(chord, [Some(ids[3]), Some(ids[0])])];
            if !segments_clear(&scratch.edges, &probe, &ids, tol) || !region_clear(&scratch.edges, &[quad], &ids) {
                continue;
            }
            let score = quad_angle_range(&quad).0;
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, i));
            }
        }
        let Some((score, i)) = best else {
            return Ok(false);
        };

        let ids = [nodes[i], nodes[(i + 1) % n], nodes[(i + 2) % n], nodes[(i + 3) % n]];
        let planned = [ids.map(Existing)];
        let lines = self.store.count_new_lines(&planned);
        self.store.reserve(0, lines, 1)?;
        self.store.link_quad(ids)?;
        self.front.replace_span(lp, ids[1], ids[2], &[], 0)?;
        for id in ids {
            self.store.mark_dirty(id)?;
        }
        self.update_angles(lp)?;
        self.stats.closures += 1;
        debug!(loop_id = lp, min_angle = score.to_degrees(), "ear cut");
        Ok(true)
    }

    fn commit_closure(&mut self, lp: usize, nodes: &[NodeId], plan: ClosurePlan) -> PaveResult<()> {
        let lines = self.store.count_new_lines(&plan.quads);
        self.store
            .reserve(usize::from(plan.centroid.is_some()), lines, plan.quads.len())?;
        let mut created = SmallVec::<[NodeId; 1]>::new();
        if let Some(c) = plan.centroid {
            let mut size = 0.0;
            for &n in nodes {
                size += self.store.node(n)?.size;
            }
            let mut node = Node::new(c, size / nodes.len() as f64);
            node.dirty = true;
            created.push(self.store.add_node(node)?);
        }
        for q in &plan.quads {
            self.store.link_quad(resolve_quad(q, &created)?)?;
        }
        self.front.retire_loop(lp)?;
        for &n in nodes {
            self.store.mark_dirty(n)?;
        }
        self.stats.closures += 1;
        debug!(
            loop_id = lp,
            nodes = nodes.len(),
            quads = plan.quads.len(),
            centroid = plan.centroid.is_some(),
            "loop closed"
        );
        Ok(())
    }
}

fn nodes_quad(nodes: &[NodeId], idx: [usize; 4]) -> [PlannedNode; 4] {
    idx.map(|k| Existing(nodes[k]))
}
