//! Diagnostics collected while assembling a curve network.
//!
//! None of the conditions counted here abort a run. They are the data
//! quality signals a caller can inspect afterwards:
//!
//! ```ignore
//! let network = context.run()?;
//! let diag = network.diagnostics();
//! if !diag.is_clean() {
//!     for warning in &diag.warnings {
//!         log::warn!("{warning}");
//!     }
//! }
//! ```

use serde::Serialize;

use crate::geom::PhaseTimingReport;

/// Counters for every local recovery path of the intersection engine.
///
/// # Intake
///
/// - `degenerate_segments_dropped`: incoming segments with coincident endpoints
/// - `duplicate_segments_skipped`: exact repeats of a segment already stored
///
/// # Assembly
///
/// - `invalid_chains_discarded`: chains (built or cut) with no usable length
/// - `interior_points_merged`: chain joints rewired onto a single shared point
///
/// # Refinement
///
/// - `refinements_rejected`: corrections that would have increased A/B disagreement
/// - `border_classification_failures`: border points whose edge has no border curve
///
/// # Topology
///
/// - `splits_merged` / `end_splits_removed`: markers dropped before cutting
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IntersectDiagnostics {
    /// Segments accepted into the segment store.
    pub segments_added: usize,
    pub degenerate_segments_dropped: usize,
    pub duplicate_segments_skipped: usize,

    /// Intersection chains kept by the chain builder.
    pub chains_built: usize,
    pub invalid_chains_discarded: usize,
    pub interior_points_merged: usize,

    /// Border chains produced by the border loader.
    pub border_chains_loaded: usize,
    /// Border edges skipped because they collapse to a point.
    pub degenerate_border_edges: usize,

    /// Points whose footprints were corrected.
    pub points_refined: usize,
    pub refinements_rejected: usize,
    pub border_classification_failures: usize,

    /// Markers placed on border chains by intersection endpoints.
    pub border_splits: usize,
    /// Markers placed on intersection chains at mutual crossings.
    pub crossing_splits: usize,
    pub splits_merged: usize,
    pub end_splits_removed: usize,

    /// Optional timing breakdown by phase.
    ///
    /// Only populated with the `intersect_metrics` feature on non-WASM targets.
    pub timing: Option<PhaseTimingReport>,

    /// Human-readable notes about recoveries worth a caller's attention.
    pub warnings: Vec<String>,
}

impl IntersectDiagnostics {
    /// True when no input had to be dropped and no refinement misbehaved.
    ///
    /// Merged markers and removed end splits are routine and do not count.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_segments_dropped == 0
            && self.duplicate_segments_skipped == 0
            && self.invalid_chains_discarded == 0
            && self.refinements_rejected == 0
            && self.border_classification_failures == 0
            && self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        assert!(IntersectDiagnostics::default().is_clean());
    }

    #[test]
    fn routine_split_cleanup_keeps_clean() {
        let diag = IntersectDiagnostics {
            splits_merged: 3,
            end_splits_removed: 2,
            ..IntersectDiagnostics::default()
        };
        assert!(diag.is_clean());
    }

    #[test]
    fn warning_marks_unclean() {
        let mut diag = IntersectDiagnostics::default();
        diag.warn("border edge collapsed");
        assert!(!diag.is_clean());
        assert_eq!(diag.warnings.len(), 1);
    }
}
