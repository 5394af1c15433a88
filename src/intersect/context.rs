//! One intersection run, from segment intake to the resolved curve network.

use serde::Serialize;

use super::border::{BorderMatch, BorderSide, detect_border_matches, load_border_chains};
use super::builder::build_chains;
use super::chain::Chain;
use super::diagnostics::IntersectDiagnostics;
use super::error::IntersectError;
use super::options::IntersectOptions;
use super::point::{IntersectionPoint, PointId, PointRegistry};
use super::refine::refine_chain;
use super::segment::{SegmentId, SegmentStore};
use super::store::NetworkStore;
use super::surfaces::{SurfaceId, SurfaceSet};
use super::topology::resolve_topology;
use crate::geom::{PhaseMetrics, Point3, Surface, TimingBucket, UwPoint};

/// Owns everything a run needs: surfaces, the point and segment arenas,
/// border matches and diagnostics.
///
/// Segments are fed in any order with [`add_segment`](Self::add_segment)
/// or [`add_segment_uw`](Self::add_segment_uw); [`run`](Self::run)
/// consumes the context and returns the finished [`CurveNetwork`].
#[derive(Debug)]
pub struct IntersectContext {
    options: IntersectOptions,
    surfaces: SurfaceSet,
    store: NetworkStore,
    border_matches: Vec<BorderMatch>,
    diagnostics: IntersectDiagnostics,
    metrics: PhaseMetrics,
}

impl IntersectContext {
    /// Creates an empty run; fails if `options` do not validate.
    pub fn new(options: IntersectOptions) -> Result<Self, IntersectError> {
        options.validate()?;
        let mut metrics = PhaseMetrics::default();
        metrics.begin();
        Ok(Self {
            options,
            surfaces: SurfaceSet::default(),
            store: NetworkStore::default(),
            border_matches: Vec::new(),
            diagnostics: IntersectDiagnostics::default(),
            metrics,
        })
    }

    #[must_use]
    pub fn options(&self) -> &IntersectOptions {
        &self.options
    }

    #[must_use]
    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    #[must_use]
    pub fn store(&self) -> &NetworkStore {
        &self.store
    }

    #[must_use]
    pub fn diagnostics(&self) -> &IntersectDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn border_matches(&self) -> &[BorderMatch] {
        &self.border_matches
    }

    pub fn add_surface(&mut self, surface: impl Surface + 'static) -> SurfaceId {
        let id = self.surfaces.insert(Box::new(surface));
        log::trace!("registered surface {id}");
        id
    }

    /// Adds one segment of the intersection between surfaces `a` and `b`.
    ///
    /// Both endpoints are projected onto both surfaces to obtain their
    /// footprints; the stored positions are the inputs unchanged. Degenerate
    /// and exactly repeated segments are counted and skipped (`Ok(None)`).
    pub fn add_segment(
        &mut self,
        a: SurfaceId,
        b: SurfaceId,
        p0: Point3,
        p1: Point3,
    ) -> Result<Option<SegmentId>, IntersectError> {
        if !p0.is_finite() || !p1.is_finite() {
            return Err(IntersectError::NonFinitePoint);
        }
        let surf_a = self.surfaces.try_get(a)?;
        let surf_b = self.surfaces.try_get(b)?;

        let options = &self.options;
        let store = &mut self.store;
        let diagnostics = &mut self.diagnostics;
        let added = self.metrics.time(TimingBucket::SegmentIntake, || {
            if !accept_geometry(store, options, diagnostics, a, b, p0, p1) {
                return None;
            }
            let start = store.add_point(p0, a, surf_a.project(p0), b, surf_b.project(p0));
            let end = store.add_point(p1, a, surf_a.project(p1), b, surf_b.project(p1));
            Some(store.add_segment(a, b, start, end))
        });

        if added.is_some() {
            self.diagnostics.segments_added += 1;
        }
        Ok(added)
    }

    /// Adds a segment given by its parameters on both surfaces.
    ///
    /// Footprints are taken as given. Each endpoint sits halfway between
    /// its two surface evaluations.
    #[allow(clippy::too_many_arguments)]
    pub fn add_segment_uw(
        &mut self,
        a: SurfaceId,
        uw_a0: UwPoint,
        uw_a1: UwPoint,
        b: SurfaceId,
        uw_b0: UwPoint,
        uw_b1: UwPoint,
    ) -> Result<Option<SegmentId>, IntersectError> {
        if ![uw_a0, uw_a1, uw_b0, uw_b1].iter().all(UwPoint::is_finite) {
            return Err(IntersectError::NonFinitePoint);
        }
        let surf_a = self.surfaces.try_get(a)?;
        let surf_b = self.surfaces.try_get(b)?;

        let options = &self.options;
        let store = &mut self.store;
        let diagnostics = &mut self.diagnostics;
        let added = self.metrics.time(TimingBucket::SegmentIntake, || {
            let p0 = surf_a.point_at_uw(uw_a0).midpoint(surf_b.point_at_uw(uw_b0));
            let p1 = surf_a.point_at_uw(uw_a1).midpoint(surf_b.point_at_uw(uw_b1));
            if !accept_geometry(store, options, diagnostics, a, b, p0, p1) {
                return None;
            }
            let start = store.add_point(p0, a, uw_a0, b, uw_b0);
            let end = store.add_point(p1, a, uw_a1, b, uw_b1);
            Some(store.add_segment(a, b, start, end))
        });

        if added.is_some() {
            self.diagnostics.segments_added += 1;
        }
        Ok(added)
    }

    /// Registers a border curve, shared by two surfaces or owned by one.
    pub fn add_border_match(&mut self, border: BorderMatch) -> Result<(), IntersectError> {
        self.surfaces.try_get(border.side_a.surface)?;
        if let Some(BorderSide { surface, .. }) = border.side_b {
            self.surfaces.try_get(surface)?;
        }
        self.border_matches.push(border);
        Ok(())
    }

    /// Detects border matches among all registered surfaces and appends
    /// them. Returns how many were found.
    pub fn detect_border_matches(&mut self) -> usize {
        let found = detect_border_matches(&self.surfaces, self.options.border_match_distance);
        let count = found.len();
        self.border_matches.extend(found);
        count
    }

    /// Assembles chains, loads borders, refines and resolves the topology.
    ///
    /// Only a strict border classification failure aborts the run.
    pub fn run(self) -> Result<CurveNetwork, IntersectError> {
        let Self {
            options,
            surfaces,
            mut store,
            border_matches,
            mut diagnostics,
            mut metrics,
        } = self;
        log::debug!(
            "intersect run: {} surfaces, {} points, {} segments, {} border matches",
            surfaces.len(),
            store.points.len(),
            store.segments.len(),
            border_matches.len()
        );

        let chains = metrics.time(TimingBucket::ChainBuild, || {
            build_chains(&mut store, &options, &mut diagnostics)
        });

        let border_chains = metrics.time(TimingBucket::BorderLoad, || {
            load_border_chains(&border_matches, &surfaces, &mut store, &options, &mut diagnostics)
        });

        metrics.time(TimingBucket::Refine, || {
            chains.iter().try_for_each(|chain| {
                refine_chain(chain, &surfaces, &mut store, &options, &mut diagnostics)
            })
        })?;

        let chains = metrics.time(TimingBucket::TopologyResolve, || {
            resolve_topology(
                border_chains,
                chains,
                &surfaces,
                &mut store,
                &options,
                &mut diagnostics,
            )
        });

        diagnostics.timing = metrics.end();
        if let Some(timing) = &diagnostics.timing {
            log::debug!("intersect run took {:.3} ms", timing.total_ms());
        }

        Ok(CurveNetwork {
            surfaces,
            store,
            chains,
            diagnostics,
        })
    }
}

/// Degenerate and duplicate filtering shared by both intake paths.
fn accept_geometry(
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
    a: SurfaceId,
    b: SurfaceId,
    p0: Point3,
    p1: Point3,
) -> bool {
    if p0.distance_squared_to(p1) < options.degenerate_segment_eps {
        log::trace!("dropping degenerate segment on {a}/{b} at {p0:?}");
        diagnostics.degenerate_segments_dropped += 1;
        return false;
    }
    if !store.segments.register_geometry(a, b, p0, p1) {
        log::trace!("skipping repeated segment on {a}/{b}");
        diagnostics.duplicate_segments_skipped += 1;
        return false;
    }
    true
}

/// The resolved network: border chains first, then intersection chains.
#[derive(Debug)]
pub struct CurveNetwork {
    surfaces: SurfaceSet,
    store: NetworkStore,
    chains: Vec<Chain>,
    diagnostics: IntersectDiagnostics,
}

/// Headline numbers of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub surfaces: usize,
    pub points: usize,
    pub segments: usize,
    pub border_chains: usize,
    pub intersection_chains: usize,
    pub total_length: f64,
}

impl CurveNetwork {
    #[must_use]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn border_chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter().filter(|c| c.is_border())
    }

    pub fn intersection_chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter().filter(|c| !c.is_border())
    }

    /// Point ids of `chain` in order.
    #[must_use]
    pub fn chain_points(&self, chain: &Chain) -> Vec<PointId> {
        chain.point_ids(&self.store)
    }

    #[must_use]
    pub fn chain_polyline(&self, chain: &Chain) -> Vec<Point3> {
        chain.polyline(&self.store)
    }

    #[must_use]
    pub fn point(&self, id: PointId) -> &IntersectionPoint {
        self.store.points.get(id)
    }

    #[must_use]
    pub fn points(&self) -> &PointRegistry {
        &self.store.points
    }

    #[must_use]
    pub fn segments(&self) -> &SegmentStore {
        &self.store.segments
    }

    #[must_use]
    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    #[must_use]
    pub fn store(&self) -> &NetworkStore {
        &self.store
    }

    #[must_use]
    pub fn diagnostics(&self) -> &IntersectDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            surfaces: self.surfaces.len(),
            points: self.store.points.len(),
            segments: self.store.segments.len(),
            border_chains: self.border_chains().count(),
            intersection_chains: self.intersection_chains().count(),
            total_length: self.chains.iter().map(|c| c.length(&self.store)).sum(),
        }
    }
}
