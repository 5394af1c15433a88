//! Geometry kernel of the intersection engine: vectors and boxes, the
//! parametric surface abstraction, border curves, parameter-space helpers
//! and a small BVH.

mod bvh;
mod core;
mod curve;
mod metrics;
mod surface;
mod uw;

pub(crate) use bvh::Bvh;
pub use self::core::{BBox, Point3, Tolerance, Vec3};
pub use curve::{BorderCurve, Curve3};
pub use metrics::{PhaseMetrics, PhaseTimingReport, TimingBucket};
pub use surface::{BorderEdge, CylinderSurface, FourPointSurface, PlaneSurface, Surface};
pub use uw::{
    UwCrossing, UwDomain, UwPoint, project_onto_segment, segment_box, segment_crossing,
};

#[cfg(test)]
mod tests;
