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

//! Tuning parameters for the paving mesher.

use std::f64::consts::{PI, TAU};

use crate::error::{PaveError, PaveResult};

/// Paving thresholds. Angles are in radians.
///
/// The defaults reproduce the usual paving constants; they govern mesh
/// quality, not correctness.
///
/// # Example
///
/// ```
/// use quadpave::PaveParams;
///
/// let params = PaveParams::default()
///     .with_smoothing_passes(5)
///     .with_wedge_ratio(3.0);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.smoothing_passes, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PaveParams {
    /// Front angles below this are END nodes.
    pub end_max: f64,
    /// Front angles below this (and at least `end_max`) are SIDE nodes.
    pub side_max: f64,
    /// Front angles below this are CORNER nodes; anything larger is a REVERSAL.
    pub corner_max: f64,
    /// Half-width of the ambiguous zone around each band edge.
    pub band_tolerance: f64,
    /// Furthest a node may sit from a band edge and still be re-banded to
    /// balance the loop's turn count.
    pub max_reband: f64,

    /// Smallest corner angle accepted in a new quad.
    pub min_element_angle: f64,
    /// Largest corner angle accepted in a new quad.
    pub max_element_angle: f64,

    /// Front nodes sharper than this are always pinched.
    pub pinch_always: f64,
    /// Front nodes sharper than this are pinched when it improves the front.
    pub pinch_if_helps: f64,

    /// Edge length ratio at a front node that triggers a wedge.
    pub wedge_ratio: f64,
    /// Bridge distance limit, as a multiple of the mean of the two edge lengths.
    pub bridge_ratio: f64,
    /// Minimum |cos| between two front edges for them to count as facing.
    pub bridge_alignment: f64,

    /// Weight of the node size hint against the local edge length when
    /// choosing a projection distance (0 = edges only, 1 = hint only).
    pub size_blend: f64,

    /// Laplacian sweeps after each operator.
    pub smoothing_passes: usize,
    /// Sweeps over every interior node once all loops are closed.
    pub final_smoothing_passes: usize,

    /// Main loop bound; `None` derives it from the quad capacity.
    pub max_iterations: Option<usize>,
}

impl Default for PaveParams {
    fn default() -> Self {
        Self {
            end_max: 135f64.to_radians(),
            side_max: 225f64.to_radians(),
            corner_max: 315f64.to_radians(),
            band_tolerance: 15f64.to_radians(),
            max_reband: 45f64.to_radians(),
            min_element_angle: 15f64.to_radians(),
            max_element_angle: 165f64.to_radians(),
            pinch_always: 0.5,
            pinch_if_helps: 1.0,
            wedge_ratio: 2.5,
            bridge_ratio: 1.3,
            bridge_alignment: 0.866,
            size_blend: 0.5,
            smoothing_passes: 3,
            final_smoothing_passes: 5,
            max_iterations: None,
        }
    }
}

impl PaveParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight element angle limits for analysis-grade meshes.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_element_angle: 30f64.to_radians(),
            max_element_angle: 150f64.to_radians(),
            smoothing_passes: 5,
            final_smoothing_passes: 10,
            ..Self::default()
        }
    }

    /// Permissive limits for awkward boundaries.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            min_element_angle: 5f64.to_radians(),
            max_element_angle: 175f64.to_radians(),
            max_reband: 60f64.to_radians(),
            ..Self::default()
        }
    }

    /// Set the element corner angle limits.
    #[must_use]
    pub const fn with_element_angles(mut self, min: f64, max: f64) -> Self {
        self.min_element_angle = min;
        self.max_element_angle = max;
        self
    }

    /// Set the pinch thresholds.
    #[must_use]
    pub const fn with_pinch_thresholds(mut self, always: f64, if_helps: f64) -> Self {
        self.pinch_always = always;
        self.pinch_if_helps = if_helps;
        self
    }

    #[must_use]
    pub const fn with_wedge_ratio(mut self, ratio: f64) -> Self {
        self.wedge_ratio = ratio;
        self
    }

    #[must_use]
    pub const fn with_bridge_ratio(mut self, ratio: f64) -> Self {
        self.bridge_ratio = ratio;
        self
    }

    #[must_use]
    pub const fn with_size_blend(mut self, blend: f64) -> Self {
        self.size_blend = blend;
        self
    }

    #[must_use]
    pub const fn with_smoothing_passes(mut self, passes: usize) -> Self {
        self.smoothing_passes = passes;
        self
    }

    #[must_use]
    pub const fn with_final_smoothing_passes(mut self, passes: usize) -> Self {
        self.final_smoothing_passes = passes;
        self
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_band_tolerance(mut self, tolerance: f64) -> Self {
        self.band_tolerance = tolerance;
        self
    }

    /// Same limits with the element angle window widened halfway towards
    /// `(0, π)`; used when no row fits the regular limits.
    #[must_use]
    pub fn relaxed(&self) -> Self {
        Self {
            min_element_angle: self.min_element_angle * 0.5,
            max_element_angle: 0.5 * (self.max_element_angle + PI),
            ..self.clone()
        }
    }

    /// Widest element window tried before a loop is given up on: the relaxed
    /// window relaxed once more, and at least `(2.5°, 177.5°)`.
    #[must_use]
    pub fn loosest(&self) -> Self {
        let twice = self.relaxed().relaxed();
        Self {
            min_element_angle: twice.min_element_angle.min(2.5f64.to_radians()),
            max_element_angle: twice.max_element_angle.max(177.5f64.to_radians()),
            ..self.clone()
        }
    }

    /// Checks ordering and ranges of every threshold.
    pub fn validate(&self) -> PaveResult<()> {
        let finite = [
            self.end_max,
            self.side_max,
            self.corner_max,
            self.band_tolerance,
            self.max_reband,
            self.min_element_angle,
            self.max_element_angle,
            self.pinch_always,
            self.pinch_if_helps,
            self.wedge_ratio,
            self.bridge_ratio,
            self.bridge_alignment,
            self.size_blend,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(PaveError::degenerate("non-finite paving parameter"));
        }
        if !(0.0 < self.end_max && self.end_max < self.side_max && self.side_max < self.corner_max && self.corner_max < TAU) {
            return Err(PaveError::degenerate("angle bands must increase within (0, 2π)"));
        }
        let narrowest = (self.end_max)
            .min(self.side_max - self.end_max)
            .min(self.corner_max - self.side_max)
            .min(TAU - self.corner_max);
        if self.band_tolerance < 0.0 || 2.0 * self.band_tolerance >= narrowest {
            return Err(PaveError::degenerate("band tolerance overlaps neighbouring bands"));
        }
        if self.max_reband < 0.0 {
            return Err(PaveError::degenerate("negative re-band limit"));
        }
        if !(0.0 < self.min_element_angle && self.min_element_angle < self.max_element_angle && self.max_element_angle < PI) {
            return Err(PaveError::degenerate("element angle limits must satisfy 0 < min < max < π"));
        }
        if !(0.0 <= self.pinch_always && self.pinch_always <= self.pinch_if_helps && self.pinch_if_helps < self.end_max) {
            return Err(PaveError::degenerate("pinch thresholds out of order"));
        }
        if self.wedge_ratio <= 1.0 {
            return Err(PaveError::degenerate("wedge ratio must exceed 1"));
        }
        if self.bridge_ratio <= 0.0 || !(0.0 < self.bridge_alignment && self.bridge_alignment <= 1.0) {
            return Err(PaveError::degenerate("bridge limits out of range"));
        }
        if !(0.0..=1.0).contains(&self.size_blend) {
            return Err(PaveError::degenerate("size blend must lie in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(PaveParams::default().validate().is_ok());
        assert!(PaveParams::strict().validate().is_ok());
        assert!(PaveParams::lenient().validate().is_ok());
        assert!(PaveParams::default().relaxed().validate().is_ok());
        assert!(PaveParams::strict().loosest().validate().is_ok());
    }

    #[test]
    fn loosest_window_contains_the_relaxed_one() {
        for params in [PaveParams::default(), PaveParams::strict(), PaveParams::lenient()] {
            let (relaxed, loosest) = (params.relaxed(), params.loosest());
            assert!(loosest.min_element_angle <= relaxed.min_element_angle);
            assert!(loosest.max_element_angle >= relaxed.max_element_angle);
            assert!(loosest.max_element_angle < PI);
            assert_eq!(loosest.end_max, params.end_max);
        }
    }

    #[test]
    fn out_of_order_bands_are_rejected() {
        let mut params = PaveParams::default();
        params.side_max = params.end_max;
        assert!(matches!(params.validate(), Err(PaveError::DegenerateInput(_))));
        let params = PaveParams::default().with_element_angles(1.0, 0.5);
        assert!(params.validate().is_err());
        let params = PaveParams::default().with_size_blend(f64::NAN);
        assert!(params.validate().is_err());
    }
}
