use super::footprint::Footprint;
use super::options::IntersectOptions;
use super::point::{PointId, PointRegistry};
use super::segment::{SegmentId, SegmentStore};
use super::surfaces::{SurfaceId, SurfaceSet};
use crate::geom::{Point3, UwPoint};

/// Where a cut along a segment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitOutcome {
    /// The cut coincides with the segment's start point.
    AtStart,
    /// The cut coincides with the segment's end point.
    AtEnd,
    /// The segment now ends at a new point; the returned segment continues
    /// from there to the old end.
    Cut(SegmentId),
}

/// The two arenas of a run: every point and every segment.
#[derive(Debug, Default, Clone)]
pub struct NetworkStore {
    pub(crate) points: PointRegistry,
    pub(crate) segments: SegmentStore,
}

impl NetworkStore {
    #[must_use]
    pub fn points(&self) -> &PointRegistry {
        &self.points
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentStore {
        &self.segments
    }

    /// Creates a point carrying footprints for both roles of a surface pair.
    pub(crate) fn add_point(
        &mut self,
        position: Point3,
        a: SurfaceId,
        uw_a: UwPoint,
        b: SurfaceId,
        uw_b: UwPoint,
    ) -> PointId {
        self.points.insert(
            position,
            vec![Footprint::new(a, uw_a), Footprint::new(b, uw_b)],
        )
    }

    pub(crate) fn add_segment(
        &mut self,
        a: SurfaceId,
        b: SurfaceId,
        start: PointId,
        end: PointId,
    ) -> SegmentId {
        self.segments.insert(&mut self.points, a, b, start, end)
    }

    /// Footprint of `point` in the A (`role == 0`) or B role of the pair `(a, b)`.
    pub(crate) fn role_footprint(
        &self,
        point: PointId,
        a: SurfaceId,
        b: SurfaceId,
        role: usize,
    ) -> Option<Footprint> {
        let p = self.points.get(point);
        let (ia, ib) = p.footprint_pair(a, b)?;
        Some(p.footprints[if role == 0 { ia } else { ib }])
    }

    /// The segment's endpoint parameters on `surface`, start first.
    ///
    /// `None` when `surface` is neither side of the segment or a footprint
    /// is missing.
    pub(crate) fn segment_uw(&self, segment: SegmentId, surface: SurfaceId) -> Option<(UwPoint, UwPoint)> {
        let seg = self.segments.get(segment);
        let (a, b) = seg.surfaces();
        let role = if surface == a {
            0
        } else if surface == b {
            1
        } else {
            return None;
        };
        let start = self.role_footprint(seg.start(), a, b, role)?;
        let end = self.role_footprint(seg.end(), a, b, role)?;
        Some((start.uw, end.uw))
    }

    /// Cuts `segment` where its parameter trace on `surface` passes `uw`.
    ///
    /// The other surface's parameters are interpolated at the same fraction
    /// and must stay inside its domain (plus `uw_slop`). The new point sits
    /// halfway between both surface evaluations. Returns `None` when the
    /// cut cannot be placed.
    pub(crate) fn split_segment(
        &mut self,
        surfaces: &SurfaceSet,
        segment: SegmentId,
        surface: SurfaceId,
        uw: UwPoint,
        options: &IntersectOptions,
    ) -> Option<SplitOutcome> {
        let seg = self.segments.get(segment).clone();
        let (a, b) = seg.surfaces();
        let (ua0, ua1) = self.segment_uw(segment, a)?;
        let (ub0, ub1) = self.segment_uw(segment, b)?;

        let on_a = surface == a;
        if !on_a && surface != b {
            return None;
        }
        let (s0, s1) = if on_a { (ua0, ua1) } else { (ub0, ub1) };
        let span = s0.distance(s1);
        let fract = if span > 0.0 {
            (s0.distance(uw) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (uw_a, uw_b) = if on_a {
            (uw, ub0.lerp(ub1, fract))
        } else {
            (ua0.lerp(ua1, fract), uw)
        };

        let surf_a = surfaces.get(a);
        let surf_b = surfaces.get(b);
        let (dom_a, dom_b) = (surf_a.domain(), surf_b.domain());
        if !dom_a.contains_with_slop(uw_a, options.uw_slop)
            || !dom_b.contains_with_slop(uw_b, options.uw_slop)
        {
            log::debug!("split of {segment} at {uw:?} on {surface} leaves the parameter domain");
            return None;
        }
        let uw_a = dom_a.clamp(uw_a);
        let uw_b = dom_b.clamp(uw_b);
        let position = surf_a.point_at_uw(uw_a).midpoint(surf_b.point_at_uw(uw_b));

        let [start, end] = seg.points;
        if position.distance_to(self.points.get(start).position()) <= options.split_snap_distance {
            return Some(SplitOutcome::AtStart);
        }
        if position.distance_to(self.points.get(end).position()) <= options.split_snap_distance {
            return Some(SplitOutcome::AtEnd);
        }

        let mid = self.add_point(position, a, uw_a, b, uw_b);
        self.segments.rewire(&mut self.points, segment, 1, mid);
        let tail = self.add_segment(a, b, mid, end);
        if seg.used {
            self.segments.consume(&mut self.points, tail);
        }
        Some(SplitOutcome::Cut(tail))
    }
}
