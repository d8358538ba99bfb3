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

//! Corner classification of a front loop.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, trace};

use crate::{
    error::{PaveError, PaveResult},
    paving::{
        driver::Paver,
        front::{AngleStatus, NodeKind},
        params::PaveParams,
        scratch::Scratch,
    },
};

/// Band of `angle` and whether it sits near a band edge.
pub fn band(angle: f64, params: &PaveParams) -> (NodeKind, AngleStatus) {
    let edges = [
        (params.end_max, NodeKind::End, NodeKind::Side),
        (params.side_max, NodeKind::Side, NodeKind::Corner),
        (params.corner_max, NodeKind::Corner, NodeKind::Reversal),
    ];
    let kind = edges
        .iter()
        .find(|(edge, _, _)| angle < *edge)
        .map_or(NodeKind::Reversal, |(_, below, _)| *below);
    let status = edges
        .iter()
        .find(|(edge, _, _)| (angle - edge).abs() < params.band_tolerance)
        .map_or(AngleStatus::Settled, |(_, lo, hi)| AngleStatus::Between(*lo, *hi));
    (kind, status)
}

/// Turn count a closed loop with these interior angles must reach.
pub fn turn_target(angles: &[f64]) -> i32 {
    let turning: f64 = angles.iter().map(|a| PI - a).sum();
    (turning / FRAC_PI_2).round() as i32
}

/// Ambiguous nodes take the band with fewer transitions.
fn settle(lo: NodeKind, hi: NodeKind) -> NodeKind {
    match (lo, hi) {
        (NodeKind::End, NodeKind::Side) | (NodeKind::Side, NodeKind::Corner) => NodeKind::Side,
        (NodeKind::Corner, NodeKind::Reversal) => NodeKind::Corner,
        (lo, _) => lo,
    }
}

/// Angular distance from `angle` to the edge between two adjacent bands.
fn reband_cost(angle: f64, from: NodeKind, to: NodeKind, params: &PaveParams) -> Option<f64> {
    let edge = match (from.min(to), from.max(to)) {
        (NodeKind::End, NodeKind::Side) => params.end_max,
        (NodeKind::Side, NodeKind::Corner) => params.side_max,
        (NodeKind::Corner, NodeKind::Reversal) => params.corner_max,
        _ => return None,
    };
    Some((angle - edge).abs())
}

/// Cyclic distance from each node to the nearest marked node, `len` if
/// there is none.
pub fn corner_distances(kinds: &[NodeKind], out: &mut Vec<usize>) {
    let n = kinds.len();
    out.clear();
    out.resize(n, n);
    if n == 0 {
        return;
    }
    let mut last = None;
    for step in 0..2 * n {
        let i = step % n;
        if kinds[i].is_marked() {
            last = Some(step);
        }
        if let Some(l) = last {
            out[i] = out[i].min(step - l);
        }
    }
    last = None;
    for step in 0..2 * n {
        let i = n - 1 - step % n;
        if kinds[i].is_marked() {
            last = Some(step);
        }
        if let Some(l) = last {
            out[i] = out[i].min(step - l);
        }
    }
}

impl Paver<'_> {
    /// Assigns END / SIDE / CORNER / REVERSAL to every node of loop `lp` so
    /// the turn weights add up to the loop's turning.
    pub fn classify_loop(&mut self, lp: usize, scratch: &mut Scratch) -> PaveResult<()> {
        self.update_angles(lp)?;
        let params = self.params;
        let buf = &mut scratch.classify;
        self.front.loop_nodes_into(lp, &mut buf.nodes)?;
        let len = buf.nodes.len();

        buf.angles.clear();
        for &n in &buf.nodes {
            buf.angles.push(self.front.record(n)?.angle);
        }
        if let Some(i) = buf.angles.iter().position(|a| !a.is_finite()) {
            return Err(PaveError::geometry_in(
                lp,
                format!("front node {} coincides with a neighbor", buf.nodes[i]),
            ));
        }

        buf.kinds.clear();
        buf.status.clear();
        for &a in &buf.angles {
            let (kind, status) = band(a, params);
            buf.kinds.push(match status {
                AngleStatus::Between(lo, hi) => settle(lo, hi),
                AngleStatus::Settled => kind,
            });
            buf.status.push(status);
        }

        let target = turn_target(&buf.angles);
        if target.unsigned_abs() as usize > len {
            return Err(PaveError::geometry_in(
                lp,
                format!("{len} nodes cannot turn {target} quarter turns"),
            ));
        }

        let mut sum: i32 = buf.kinds.iter().map(|k| k.turn_weight()).sum();
        while sum != target {
            let up = target > sum;
            corner_distances(&buf.kinds, &mut buf.distance);
            let pick = (0..len)
                .filter_map(|i| {
                    let from = buf.kinds[i];
                    let to = if up { from.narrower() } else { from.wider() }?;
                    let cost = reband_cost(buf.angles[i], from, to, params)?;
                    (cost <= params.max_reband).then_some((i, to, cost.to_degrees().round() as i64))
                })
                .min_by(|a, b| {
                    a.2.cmp(&b.2)
                        .then(buf.distance[b.0].cmp(&buf.distance[a.0]))
                        .then(a.0.cmp(&b.0))
                });
            let Some((i, to, _)) = pick else {
                return Err(PaveError::geometry_in(
                    lp,
                    format!("corner turns cannot be balanced ({sum} against {target})"),
                ));
            };
            trace!(node = %buf.nodes[i], from = ?buf.kinds[i], to = ?to, "re-banded");
            buf.kinds[i] = to;
            sum += if up { 1 } else { -1 };
        }

        let ends: Vec<usize> = (0..len).filter(|&i| buf.kinds[i] == NodeKind::End).collect();
        if let [lone] = ends.as_slice() {
            buf.kinds[*lone] = NodeKind::Side;
        }

        corner_distances(&buf.kinds, &mut buf.distance);
        for i in 0..len {
            let rec = self.front.record_mut(buf.nodes[i])?;
            rec.kind = buf.kinds[i];
            rec.status = buf.status[i];
            rec.corner_distance = buf.distance[i];
        }
        debug!(loop_id = lp, len, target, ends = ends.len(), "loop classified");
        Ok(())
    }
}
