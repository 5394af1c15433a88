//! Opt-in phase timing for intersection runs.
//!
//! Timing is only collected when the `intersect_metrics` feature is enabled
//! and the target is not WASM (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to running the closure.
//!
//! # Usage
//!
//! ```ignore
//! let mut metrics = PhaseMetrics::default();
//! metrics.begin();
//! let chains = metrics.time(TimingBucket::ChainBuild, || build_chains(...));
//! if let Some(report) = metrics.end() {
//!     log::debug!("chain build took {} ns", report.chain_build_ns);
//! }
//! ```

use serde::Serialize;

/// Phases of one intersection run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Segment intake and footprint projection.
    SegmentIntake,
    /// Greedy stitching of segments into chains.
    ChainBuild,
    /// Border tessellation into border chains.
    BorderLoad,
    /// Footprint reconciliation on intersection chains.
    Refine,
    /// Border splits, crossing splits and final collection.
    TopologyResolve,
}

/// Cumulative nanoseconds per phase.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTimingReport {
    pub segment_intake_ns: u64,
    pub chain_build_ns: u64,
    pub border_load_ns: u64,
    pub refine_ns: u64,
    pub topology_resolve_ns: u64,
}

impl PhaseTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.segment_intake_ns
            .saturating_add(self.chain_build_ns)
            .saturating_add(self.border_load_ns)
            .saturating_add(self.refine_ns)
            .saturating_add(self.topology_resolve_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn slot(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::SegmentIntake => &mut self.segment_intake_ns,
            TimingBucket::ChainBuild => &mut self.chain_build_ns,
            TimingBucket::BorderLoad => &mut self.border_load_ns,
            TimingBucket::Refine => &mut self.refine_ns,
            TimingBucket::TopologyResolve => &mut self.topology_resolve_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.slot(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "intersect_metrics", not(target_arch = "wasm32")))] {
        /// Accumulator for phase timings.
        #[derive(Debug, Default)]
        pub struct PhaseMetrics {
            report: PhaseTimingReport,
        }

        impl PhaseMetrics {
            /// Resets all timing counters to zero.
            pub fn begin(&mut self) {
                self.report = PhaseTimingReport::default();
            }

            /// Returns the accumulated timing report.
            #[must_use]
            pub fn end(&self) -> Option<PhaseTimingReport> {
                Some(self.report.clone())
            }

            /// Times `f` and accumulates the elapsed time in `bucket`.
            pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
                let start = std::time::Instant::now();
                let result = f();
                let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
                self.report.add(bucket, nanos);
                result
            }
        }
    } else {
        /// Accumulator for phase timings (disabled build: no-op).
        #[derive(Debug, Default)]
        pub struct PhaseMetrics;

        impl PhaseMetrics {
            pub fn begin(&mut self) {}

            /// Always `None` without the `intersect_metrics` feature.
            #[must_use]
            pub fn end(&self) -> Option<PhaseTimingReport> {
                None
            }

            pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
                let _ = bucket;
                f()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let mut report = PhaseTimingReport::default();
        report.add(TimingBucket::ChainBuild, 1000);
        report.add(TimingBucket::Refine, 2000);
        report.add(TimingBucket::TopologyResolve, 3000);
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_report_add_saturates() {
        let mut report = PhaseTimingReport::default();
        report.add(TimingBucket::BorderLoad, u64::MAX);
        report.add(TimingBucket::BorderLoad, 10);
        assert_eq!(report.border_load_ns, u64::MAX);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = PhaseMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::SegmentIntake, || 42);
        assert_eq!(result, 42);
        let report = metrics.end();
        if cfg!(all(feature = "intersect_metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }
}
