//! Curve-network assembly from unordered surface/surface intersection
//! segments.
//!
//! A run goes through five phases:
//!
//! 1. segment intake ([`IntersectContext::add_segment`])
//! 2. chain building: greedy k-nearest stitching
//! 3. border loading: parametric edges become border chains
//! 4. refinement: both footprints of every point are made to agree
//! 5. topology: border and crossing splits
//!
//! All state lives in an [`IntersectContext`]; nothing is global.

mod border;
mod builder;
mod chain;
mod context;
mod diagnostics;
mod error;
mod footprint;
mod options;
mod point;
mod refine;
mod segment;
mod store;
mod surfaces;
mod topology;

pub use border::{BorderMatch, BorderSide};
pub use chain::{Chain, SplitMarker};
pub use context::{CurveNetwork, IntersectContext, NetworkSummary};
pub use diagnostics::IntersectDiagnostics;
pub use error::IntersectError;
pub use footprint::Footprint;
pub use options::IntersectOptions;
pub use point::{IntersectionPoint, PointId, PointRegistry};
pub use segment::{Segment, SegmentId, SegmentStore};
pub use store::NetworkStore;
pub use surfaces::{SurfaceId, SurfaceSet};

#[cfg(test)]
mod tests;
