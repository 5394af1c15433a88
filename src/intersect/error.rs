use super::point::PointId;
use super::surfaces::SurfaceId;

/// Hard failures of an intersection run.
///
/// Everything recoverable (degenerate segments, rejected refinements,
/// frivolous splits) is counted in `IntersectDiagnostics` instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntersectError {
    #[error("surface {0} is not registered in this run")]
    UnknownSurface(SurfaceId),
    #[error("segment endpoints and parameters must be finite")]
    NonFinitePoint,
    #[error("invalid intersection options: {0}")]
    InvalidOptions(String),
    #[error("point {point} on {surface_a}/{surface_b} is on a border that has no border curve")]
    BorderClassification {
        point: PointId,
        surface_a: SurfaceId,
        surface_b: SurfaceId,
    },
}
