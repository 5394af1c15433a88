use serde::{Deserialize, Serialize};

use super::surfaces::SurfaceId;
use crate::geom::UwPoint;

/// Where a network point sits in one surface's parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub surface: SurfaceId,
    pub uw: UwPoint,
}

impl Footprint {
    #[must_use]
    pub const fn new(surface: SurfaceId, uw: UwPoint) -> Self {
        Self { surface, uw }
    }
}
