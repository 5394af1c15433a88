use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::IntersectError;
use crate::geom::Surface;

/// Stable identity of a surface registered in one run.
///
/// Surfaces are compared only through this id; the network never looks at
/// what kind of surface sits behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub(crate) u32);

impl SurfaceId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// The surfaces of one run, addressed by [`SurfaceId`].
#[derive(Default)]
pub struct SurfaceSet {
    surfaces: Vec<Box<dyn Surface>>,
}

impl fmt::Debug for SurfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceSet")
            .field("len", &self.surfaces.len())
            .finish()
    }
}

impl SurfaceSet {
    pub(crate) fn insert(&mut self, surface: Box<dyn Surface>) -> SurfaceId {
        let id = SurfaceId(self.surfaces.len() as u32);
        self.surfaces.push(surface);
        id
    }

    /// Looks up a surface, failing for ids that were never registered.
    pub fn try_get(&self, id: SurfaceId) -> Result<&dyn Surface, IntersectError> {
        self.surfaces
            .get(id.index())
            .map(AsRef::as_ref)
            .ok_or(IntersectError::UnknownSurface(id))
    }

    /// Infallible lookup for ids already validated at intake.
    pub(crate) fn get(&self, id: SurfaceId) -> &dyn Surface {
        self.surfaces[id.index()].as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + use<> {
        (0..self.surfaces.len() as u32).map(SurfaceId)
    }
}
