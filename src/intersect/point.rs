use std::fmt;

use serde::{Deserialize, Serialize};

use super::footprint::Footprint;
use super::segment::SegmentId;
use super::surfaces::SurfaceId;
use crate::geom::{Bvh, Point3};

/// Index of a point in the [`PointRegistry`] of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub(crate) u32);

impl PointId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A vertex of the curve network.
///
/// Footprint 0 belongs to surface A of the segment that created the point and
/// footprint 1 to surface B; a border point repeats its single surface.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionPoint {
    pub(crate) position: Point3,
    pub(crate) footprints: Vec<Footprint>,
    pub(crate) segments: Vec<SegmentId>,
    pub(crate) used: bool,
}

impl IntersectionPoint {
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    #[must_use]
    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    /// Incident segments, in the order they were attached.
    #[must_use]
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// First footprint on `surface`.
    #[must_use]
    pub fn footprint_on(&self, surface: SurfaceId) -> Option<&Footprint> {
        self.footprints.iter().find(|f| f.surface == surface)
    }

    /// Indices of the footprints that play the A and B roles for a chain
    /// between `a` and `b`.
    ///
    /// For `a == b` the second footprint on that surface is preferred so
    /// both roles stay distinct when the point carries two.
    #[must_use]
    pub fn footprint_pair(&self, a: SurfaceId, b: SurfaceId) -> Option<(usize, usize)> {
        let ia = self.footprints.iter().position(|f| f.surface == a)?;
        let ib = if a == b {
            self.footprints
                .iter()
                .skip(ia + 1)
                .position(|f| f.surface == b)
                .map_or(ia, |offset| ia + 1 + offset)
        } else {
            self.footprints.iter().position(|f| f.surface == b)?
        };
        Some((ia, ib))
    }

    /// Whether the point has footprints on both surfaces of a chain.
    #[must_use]
    pub fn has_footprints_on(&self, a: SurfaceId, b: SurfaceId) -> bool {
        self.footprint_pair(a, b).is_some()
    }
}

/// Arena owning every point of one run.
#[derive(Debug, Default, Clone)]
pub struct PointRegistry {
    points: Vec<IntersectionPoint>,
}

impl PointRegistry {
    pub(crate) fn insert(&mut self, position: Point3, footprints: Vec<Footprint>) -> PointId {
        let id = PointId(self.points.len() as u32);
        self.points.push(IntersectionPoint {
            position,
            footprints,
            segments: Vec::new(),
            used: false,
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: PointId) -> &IntersectionPoint {
        &self.points[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: PointId) -> &mut IntersectionPoint {
        &mut self.points[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, &IntersectionPoint)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (PointId(i as u32), p))
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = PointId> + use<> {
        (0..self.points.len() as u32).map(PointId)
    }

    pub(crate) fn mark_used(&mut self, id: PointId) {
        self.points[id.index()].used = true;
    }

    pub(crate) fn attach(&mut self, id: PointId, segment: SegmentId) {
        let segments = &mut self.points[id.index()].segments;
        if !segments.contains(&segment) {
            segments.push(segment);
        }
    }

    pub(crate) fn detach(&mut self, id: PointId, segment: SegmentId) {
        self.points[id.index()].segments.retain(|&s| s != segment);
    }
}

/// Snapshot spatial index over the points that carry at least one segment.
///
/// Built once at the start of chain assembly; positions do not move while
/// chains are stitched, so the snapshot stays exact for that phase.
#[derive(Debug)]
pub(crate) struct PointIndex {
    bvh: Option<Bvh>,
    ids: Vec<PointId>,
    positions: Vec<Point3>,
}

impl PointIndex {
    pub(crate) fn build(points: &PointRegistry) -> Self {
        let (ids, positions): (Vec<PointId>, Vec<Point3>) = points
            .iter()
            .filter(|(_, p)| !p.segments.is_empty())
            .map(|(id, p)| (id, p.position))
            .unzip();
        let bvh = Bvh::build_points(&positions);
        Self {
            bvh,
            ids,
            positions,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    /// Up to `k` indexed points within `max_distance` of `at` that pass
    /// `accept`, nearest first.
    ///
    /// Rejected points never occupy one of the `k` slots, so a cluster of
    /// coincident but unusable points cannot hide a farther match.
    pub(crate) fn nearest(
        &self,
        at: Point3,
        k: usize,
        max_distance: f64,
        mut accept: impl FnMut(PointId) -> bool,
    ) -> Vec<(PointId, f64)> {
        let Some(bvh) = &self.bvh else {
            return Vec::new();
        };
        bvh.nearest_k(at, k, max_distance * max_distance, |prim| {
            accept(self.ids[prim]).then(|| self.positions[prim].distance_squared_to(at))
        })
        .into_iter()
        .map(|(prim, d2)| (self.ids[prim], d2))
        .collect()
    }
}
