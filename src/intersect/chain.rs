use std::collections::VecDeque;

use serde::Serialize;

use super::footprint::Footprint;
use super::options::IntersectOptions;
use super::point::PointId;
use super::segment::SegmentId;
use super::store::{NetworkStore, SplitOutcome};
use super::surfaces::{SurfaceId, SurfaceSet};
use crate::geom::{Point3, UwPoint, project_onto_segment};

/// Border splits this close (as a fraction) to a chain end would cut nothing.
const BORDER_SPLIT_END_FRACTION: f64 = 1e-5;

/// A recorded place where a chain must be cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitMarker {
    /// Surface whose parameters `uw` refers to.
    pub surface: SurfaceId,
    /// Position of the segment within the chain.
    pub index: usize,
    /// Fraction along that segment, used for ordering.
    pub fract: f64,
    pub uw: UwPoint,
}

/// An ordered, oriented run of segments between two surfaces.
///
/// Consecutive segments share an endpoint. After assembly that endpoint is
/// the identical [`PointId`], not merely a coincident position.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub(crate) surface_a: SurfaceId,
    pub(crate) surface_b: SurfaceId,
    pub(crate) border: bool,
    pub(crate) segments: VecDeque<SegmentId>,
    pub(crate) splits: Vec<SplitMarker>,
}

impl Chain {
    pub(crate) fn new(surface_a: SurfaceId, surface_b: SurfaceId, border: bool) -> Self {
        Self {
            surface_a,
            surface_b,
            border,
            segments: VecDeque::new(),
            splits: Vec::new(),
        }
    }

    fn child(&self, segments: VecDeque<SegmentId>) -> Self {
        Self {
            segments,
            ..Self::new(self.surface_a, self.surface_b, self.border)
        }
    }

    #[must_use]
    pub fn surfaces(&self) -> (SurfaceId, SurfaceId) {
        (self.surface_a, self.surface_b)
    }

    /// Whether `surface` is one of the chain's two sides.
    #[must_use]
    pub fn touches(&self, surface: SurfaceId) -> bool {
        self.surface_a == surface || self.surface_b == surface
    }

    #[must_use]
    pub fn is_border(&self) -> bool {
        self.border
    }

    #[must_use]
    pub fn segments(&self) -> &VecDeque<SegmentId> {
        &self.segments
    }

    #[must_use]
    pub fn splits(&self) -> &[SplitMarker] {
        &self.splits
    }

    #[must_use]
    pub fn first_point(&self, store: &NetworkStore) -> Option<PointId> {
        self.segments
            .front()
            .map(|&s| store.segments.get(s).start())
    }

    #[must_use]
    pub fn last_point(&self, store: &NetworkStore) -> Option<PointId> {
        self.segments.back().map(|&s| store.segments.get(s).end())
    }

    /// Points along the chain: the first start, then every segment end.
    #[must_use]
    pub fn point_ids(&self, store: &NetworkStore) -> Vec<PointId> {
        let mut ids = Vec::with_capacity(self.segments.len() + 1);
        ids.extend(self.first_point(store));
        ids.extend(self.segments.iter().map(|&s| store.segments.get(s).end()));
        ids
    }

    #[must_use]
    pub fn polyline(&self, store: &NetworkStore) -> Vec<Point3> {
        self.point_ids(store)
            .into_iter()
            .map(|id| store.points.get(id).position())
            .collect()
    }

    #[must_use]
    pub fn length(&self, store: &NetworkStore) -> f64 {
        self.segments
            .iter()
            .map(|&s| store.segments.get(s).length(&store.points))
            .sum()
    }

    /// At least one segment and a length of at least `min_length`.
    #[must_use]
    pub fn is_valid(&self, store: &NetworkStore, min_length: f64) -> bool {
        !self.segments.is_empty() && self.length(store) >= min_length
    }

    /// Every pair of consecutive segments shares the identical point.
    #[must_use]
    pub fn is_continuous(&self, store: &NetworkStore) -> bool {
        self.segments.iter().zip(self.segments.iter().skip(1)).all(|(&prev, &next)| {
            store.segments.get(prev).end() == store.segments.get(next).start()
        })
    }

    /// Prepends `segment`, flipping it so its end is nearest the current front.
    pub(crate) fn join_front(&mut self, store: &mut NetworkStore, segment: SegmentId) {
        if let Some(front) = self.first_point(store) {
            let at = store.points.get(front).position();
            let seg = store.segments.get(segment);
            let to_start = store.points.get(seg.start()).position().distance_squared_to(at);
            let to_end = store.points.get(seg.end()).position().distance_squared_to(at);
            if to_start < to_end {
                store.segments.flip(segment);
            }
        }
        self.segments.push_front(segment);
    }

    /// Appends `segment`, flipping it so its start is nearest the current back.
    pub(crate) fn join_back(&mut self, store: &mut NetworkStore, segment: SegmentId) {
        if let Some(back) = self.last_point(store) {
            let at = store.points.get(back).position();
            let seg = store.segments.get(segment);
            let to_start = store.points.get(seg.start()).position().distance_squared_to(at);
            let to_end = store.points.get(seg.end()).position().distance_squared_to(at);
            if to_end < to_start {
                store.segments.flip(segment);
            }
        }
        self.segments.push_back(segment);
    }

    /// Rewires every joint so the next segment starts at the previous
    /// segment's end point. Returns how many joints changed.
    pub(crate) fn merge_interior_points(&self, store: &mut NetworkStore) -> usize {
        let mut merged = 0;
        for (&prev, &next) in self.segments.iter().zip(self.segments.iter().skip(1)) {
            let joint = store.segments.get(prev).end();
            if store.segments.get(next).start() != joint {
                store.segments.rewire(&mut store.points, next, 0, joint);
                merged += 1;
            }
        }
        merged
    }

    /// Records a cut at the border location nearest to `footprint`.
    ///
    /// Every segment's parameter trace on the footprint's surface is tried.
    /// The chain's own two ends are excluded. The marker is placed only when
    /// the nearest projection lies within `border_split_distance` in 3-D.
    pub(crate) fn add_border_split(
        &mut self,
        footprint: Footprint,
        surfaces: &SurfaceSet,
        store: &NetworkStore,
        options: &IntersectOptions,
    ) -> bool {
        if !self.touches(footprint.surface) {
            return false;
        }
        let surface = surfaces.get(footprint.surface);
        let target = surface.point_at_uw(footprint.uw);
        let last = self.segments.len().saturating_sub(1);

        let mut best: Option<(usize, f64, f64, UwPoint)> = None;
        for (i, &seg) in self.segments.iter().enumerate() {
            let Some((u0, u1)) = store.segment_uw(seg, footprint.surface) else {
                continue;
            };
            let Some(t) = project_onto_segment(footprint.uw, u0, u1) else {
                continue;
            };
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            if (i == 0 && t <= BORDER_SPLIT_END_FRACTION)
                || (i == last && t >= 1.0 - BORDER_SPLIT_END_FRACTION)
            {
                continue;
            }
            let projected = u0.lerp(u1, t);
            let dist = surface.point_at_uw(projected).distance_to(target);
            if best.is_none_or(|(_, d, _, _)| dist < d) {
                best = Some((i, dist, t, projected));
            }
        }

        match best {
            Some((index, dist, fract, uw)) if dist < options.border_split_distance => {
                self.splits.push(SplitMarker {
                    surface: footprint.surface,
                    index,
                    fract,
                    uw,
                });
                true
            }
            _ => false,
        }
    }

    pub(crate) fn add_split(&mut self, surface: SurfaceId, index: usize, fract: f64, uw: UwPoint) {
        self.splits.push(SplitMarker {
            surface,
            index,
            fract,
            uw,
        });
    }

    /// Collapses markers whose 3-D locations lie within `tolerance` of an
    /// earlier marker. Returns how many were dropped.
    pub(crate) fn merge_splits(&mut self, surfaces: &SurfaceSet, tolerance: f64) -> usize {
        let before = self.splits.len();
        let mut kept: Vec<(SplitMarker, Point3)> = Vec::with_capacity(before);
        for marker in self.splits.drain(..) {
            let at = surfaces.get(marker.surface).point_at_uw(marker.uw);
            if kept.iter().all(|(_, p)| p.distance_to(at) >= tolerance) {
                kept.push((marker, at));
            }
        }
        self.splits = kept.into_iter().map(|(m, _)| m).collect();
        before - self.splits.len()
    }

    /// Drops markers sitting on the chain's own first or last point.
    ///
    /// Markers on a surface the chain does not touch are dropped too.
    pub(crate) fn remove_end_splits(&mut self, store: &NetworkStore, tolerance: f64) -> usize {
        let ends: Vec<PointId> = self
            .first_point(store)
            .into_iter()
            .chain(self.last_point(store))
            .collect();
        let before = self.splits.len();
        let (a, b) = (self.surface_a, self.surface_b);
        self.splits.retain(|marker| {
            if marker.surface != a && marker.surface != b {
                log::debug!("dropping split on {} for chain {a}/{b}", marker.surface);
                return false;
            }
            let role = usize::from(marker.surface != a);
            ends.iter().all(|&end| {
                store
                    .role_footprint(end, a, b, role)
                    .is_none_or(|fp| fp.uw.distance(marker.uw) > tolerance)
            })
        });
        before - self.splits.len()
    }

    /// Cuts the chain at every marker and returns the pieces in chain order.
    ///
    /// Markers are applied from the back (descending segment index, then
    /// fraction) so earlier indices stay valid while later ones are cut.
    /// Pieces inherit the surface pair and border flag; the parent is consumed.
    pub(crate) fn sort_and_split(
        mut self,
        surfaces: &SurfaceSet,
        store: &mut NetworkStore,
        options: &IntersectOptions,
    ) -> Vec<Chain> {
        let mut markers = std::mem::take(&mut self.splits);
        markers.sort_by(|x, y| {
            y.index
                .cmp(&x.index)
                .then_with(|| y.fract.total_cmp(&x.fract))
        });

        let mut tails = Vec::new();
        for marker in markers {
            let Some(&segment) = self.segments.get(marker.index) else {
                continue;
            };
            let Some(outcome) =
                store.split_segment(surfaces, segment, marker.surface, marker.uw, options)
            else {
                continue;
            };
            let keep = match outcome {
                SplitOutcome::AtStart => marker.index,
                SplitOutcome::AtEnd | SplitOutcome::Cut(_) => marker.index + 1,
            };
            let mut tail = self.segments.split_off(keep.min(self.segments.len()));
            if let SplitOutcome::Cut(new_segment) = outcome {
                tail.push_front(new_segment);
            }
            if !tail.is_empty() && !self.segments.is_empty() {
                tails.push(self.child(tail));
            } else {
                // A cut at the chain's own end: nothing to separate.
                self.segments.append(&mut tail);
            }
        }

        tails.push(self);
        tails.reverse();
        tails
    }
}
