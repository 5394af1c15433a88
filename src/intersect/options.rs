use serde::{Deserialize, Serialize};

use super::error::IntersectError;

/// Tolerances and limits of one intersection run.
///
/// Distances are 3-D model units unless noted. Parameter-space tolerances
/// are fractions of the relevant domain span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectOptions {
    /// Squared endpoint distance below which an incoming segment is degenerate.
    pub degenerate_segment_eps: f64,
    /// Nearest points inspected when looking for the continuation of a chain.
    pub neighbor_count: usize,
    /// Farthest a continuation point may be from the chain end.
    pub match_distance: f64,
    /// Shortest total length of a chain worth keeping.
    pub min_chain_length: f64,
    /// Border tessellation density: points per unit of parameter span.
    pub border_points_per_span: usize,
    /// Sample distance under which two border edges are the same curve.
    pub border_match_distance: f64,
    /// Parameter-space distance (relative) at which a footprint counts as on a border.
    pub border_tolerance: f64,
    /// A/B disagreement under which a point is already refined.
    pub refine_tolerance: f64,
    /// Newton iterations per refinement.
    pub refine_iterations: usize,
    /// Farthest an intersection endpoint may be from a border chain to split it.
    pub border_split_distance: f64,
    /// Split markers closer than this collapse into one.
    pub split_merge_distance: f64,
    /// Parameter distance from a chain end under which a crossing split is dropped.
    pub end_split_distance: f64,
    /// A cut this close to an existing segment end reuses that end.
    pub split_snap_distance: f64,
    /// Relative slop allowed outside the domain for interpolated split footprints.
    pub uw_slop: f64,
    /// Fail the run instead of skipping points on borders without a border curve.
    pub strict_border_classification: bool,
}

impl Default for IntersectOptions {
    fn default() -> Self {
        Self {
            degenerate_segment_eps: f64::EPSILON,
            neighbor_count: 4,
            match_distance: 1e-5,
            min_chain_length: 1e-4,
            border_points_per_span: 5,
            border_match_distance: 1e-4,
            border_tolerance: 1e-6,
            refine_tolerance: 1e-10,
            refine_iterations: 16,
            border_split_distance: 1e-3,
            split_merge_distance: 1e-6,
            end_split_distance: 1e-7,
            split_snap_distance: 1e-9,
            uw_slop: 1e-4,
            strict_border_classification: false,
        }
    }
}

impl IntersectOptions {
    /// Rejects tolerances that would make the run meaningless.
    pub fn validate(&self) -> Result<(), IntersectError> {
        let positive = [
            ("degenerate_segment_eps", self.degenerate_segment_eps),
            ("match_distance", self.match_distance),
            ("min_chain_length", self.min_chain_length),
            ("border_match_distance", self.border_match_distance),
            ("border_tolerance", self.border_tolerance),
            ("refine_tolerance", self.refine_tolerance),
            ("border_split_distance", self.border_split_distance),
            ("split_merge_distance", self.split_merge_distance),
            ("end_split_distance", self.end_split_distance),
            ("split_snap_distance", self.split_snap_distance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(IntersectError::InvalidOptions(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !self.uw_slop.is_finite() || self.uw_slop < 0.0 {
            return Err(IntersectError::InvalidOptions(format!(
                "uw_slop must be finite and >= 0, got {}",
                self.uw_slop
            )));
        }
        if self.neighbor_count == 0 {
            return Err(IntersectError::InvalidOptions(
                "neighbor_count must be at least 1".to_string(),
            ));
        }
        if self.border_points_per_span < 2 {
            return Err(IntersectError::InvalidOptions(
                "border_points_per_span must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(IntersectOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_neighbor_count_is_rejected() {
        let options = IntersectOptions {
            neighbor_count: 0,
            ..IntersectOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(IntersectError::InvalidOptions(_))
        ));
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let options = IntersectOptions {
            match_distance: f64::NAN,
            ..IntersectOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("match_distance"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: IntersectOptions =
            serde_json::from_str(r#"{ "neighbor_count": 6, "strict_border_classification": true }"#)
                .unwrap();
        assert_eq!(options.neighbor_count, 6);
        assert!(options.strict_border_classification);
        assert_eq!(options.min_chain_length, IntersectOptions::default().min_chain_length);
    }
}
