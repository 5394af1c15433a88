use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::point::{PointId, PointRegistry};
use super::surfaces::SurfaceId;
use crate::geom::Point3;

/// Index of a segment in the [`SegmentStore`] of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub(crate) u32);

impl SegmentId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// A short straight piece of an intersection or border curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub(crate) surface_a: SurfaceId,
    pub(crate) surface_b: SurfaceId,
    pub(crate) points: [PointId; 2],
    pub(crate) used: bool,
}

impl Segment {
    #[must_use]
    pub fn surfaces(&self) -> (SurfaceId, SurfaceId) {
        (self.surface_a, self.surface_b)
    }

    #[must_use]
    pub fn start(&self) -> PointId {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> PointId {
        self.points[1]
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used
    }

    #[must_use]
    pub fn length(&self, points: &PointRegistry) -> f64 {
        points
            .get(self.start())
            .position()
            .distance_to(points.get(self.end()).position())
    }
}

/// Exact identity of a segment's geometry, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DuplicateKey {
    surfaces: (SurfaceId, SurfaceId),
    ends: ([u64; 3], [u64; 3]),
}

impl DuplicateKey {
    fn new(a: SurfaceId, b: SurfaceId, p0: Point3, p1: Point3) -> Self {
        let bits = |p: Point3| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        let (e0, e1) = (bits(p0), bits(p1));
        Self {
            surfaces: (a.min(b), a.max(b)),
            ends: (e0.min(e1), e0.max(e1)),
        }
    }
}

/// Arena owning every segment of one run.
#[derive(Debug, Default, Clone)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    seen: HashSet<DuplicateKey>,
}

impl SegmentStore {
    /// Records the geometry of an incoming segment; `false` if an identical
    /// one (same surface pair, same endpoints in either direction) was
    /// already seen.
    pub(crate) fn register_geometry(
        &mut self,
        a: SurfaceId,
        b: SurfaceId,
        p0: Point3,
        p1: Point3,
    ) -> bool {
        self.seen.insert(DuplicateKey::new(a, b, p0, p1))
    }

    /// Adds a segment between two existing points and attaches it to both.
    pub(crate) fn insert(
        &mut self,
        points: &mut PointRegistry,
        a: SurfaceId,
        b: SurfaceId,
        start: PointId,
        end: PointId,
    ) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Segment {
            surface_a: a,
            surface_b: b,
            points: [start, end],
            used: false,
        });
        points.attach(start, id);
        points.attach(end, id);
        id
    }

    #[must_use]
    pub fn get(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| (SegmentId(i as u32), s))
    }

    /// Reverses the direction of a segment.
    pub(crate) fn flip(&mut self, id: SegmentId) {
        self.segments[id.index()].points.swap(0, 1);
    }

    /// Marks the segment and both of its endpoints as consumed.
    pub(crate) fn consume(&mut self, points: &mut PointRegistry, id: SegmentId) {
        let segment = &mut self.segments[id.index()];
        segment.used = true;
        let [start, end] = segment.points;
        points.mark_used(start);
        points.mark_used(end);
    }

    /// Replaces one endpoint of a segment, moving the incidence record.
    pub(crate) fn rewire(
        &mut self,
        points: &mut PointRegistry,
        id: SegmentId,
        slot: usize,
        to: PointId,
    ) {
        let from = self.segments[id.index()].points[slot];
        if from == to {
            return;
        }
        self.segments[id.index()].points[slot] = to;
        let other = self.segments[id.index()].points[1 - slot];
        if other != from {
            points.detach(from, id);
        }
        points.attach(to, id);
    }
}
