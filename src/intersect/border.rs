//! Border chains: tessellated parametric edges of the surfaces.
//!
//! A border match pairs an edge of one surface with the coincident edge of
//! a neighbor. Edges without a neighbor (an open shell) become single-sided
//! matches whose chain uses the same surface for both roles.

use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::diagnostics::IntersectDiagnostics;
use super::options::IntersectOptions;
use super::point::PointId;
use super::store::NetworkStore;
use super::surfaces::{SurfaceId, SurfaceSet};
use crate::geom::{BorderCurve, BorderEdge, Curve3, Point3};

const MATCH_SAMPLES: usize = 5;

/// Upper bound on the points of one tessellated border.
const MAX_BORDER_POINTS: usize = 1 << 14;

/// One edge of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    pub surface: SurfaceId,
    pub edge: BorderEdge,
}

impl BorderSide {
    #[must_use]
    pub const fn new(surface: SurfaceId, edge: BorderEdge) -> Self {
        Self { surface, edge }
    }
}

/// A border curve shared by two surfaces, or owned by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderMatch {
    pub side_a: BorderSide,
    /// `None` for a border no other surface continues.
    pub side_b: Option<BorderSide>,
}

impl BorderMatch {
    #[must_use]
    pub const fn shared(side_a: BorderSide, side_b: BorderSide) -> Self {
        Self {
            side_a,
            side_b: Some(side_b),
        }
    }

    #[must_use]
    pub const fn single(side: BorderSide) -> Self {
        Self {
            side_a: side,
            side_b: None,
        }
    }
}

/// Tessellates every match into a border chain.
///
/// Side A is sampled uniformly; side B follows by closest-point projection
/// onto its own border curve. Consecutive segments share their points, so
/// border chains come out continuous without any stitching.
pub fn load_border_chains(
    matches: &[BorderMatch],
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Vec<Chain> {
    let mut chains = Vec::with_capacity(matches.len());

    for m in matches {
        let side_b = m.side_b.unwrap_or(m.side_a);
        let surf_a = surfaces.get(m.side_a.surface);
        let surf_b = surfaces.get(side_b.surface);
        let (Some(curve_a), Some(curve_b)) = (
            BorderCurve::new(surf_a, m.side_a.edge),
            BorderCurve::new(surf_b, side_b.edge),
        ) else {
            diagnostics.degenerate_border_edges += 1;
            diagnostics.warn(format!(
                "border {:?} of {} matched with {:?} of {} collapses to a point; skipped",
                m.side_a.edge, m.side_a.surface, side_b.edge, side_b.surface
            ));
            continue;
        };

        let span = m.side_a.edge.span(&surf_a.domain());
        let count = border_point_count(span, options.border_points_per_span);
        if count == MAX_BORDER_POINTS {
            log::debug!(
                "border {:?} of {} spans {span}; tessellation capped at {count} points",
                m.side_a.edge,
                m.side_a.surface
            );
        }

        let mut ids: Vec<PointId> = Vec::with_capacity(count);
        let mut guess_b = 0.0;
        for i in 0..count {
            let t = i as f64 / (count - 1) as f64;
            let uw_a = curve_a.uw_at(t);
            let p_a = surf_a.point_at_uw(uw_a);
            let uw_b = if side_b == m.side_a {
                uw_a
            } else {
                guess_b = curve_b.closest_param(p_a, guess_b);
                curve_b.uw_at(guess_b)
            };
            let position = p_a.midpoint(surf_b.point_at_uw(uw_b));
            ids.push(store.add_point(
                position,
                m.side_a.surface,
                uw_a,
                side_b.surface,
                uw_b,
            ));
        }

        let mut chain = Chain::new(m.side_a.surface, side_b.surface, true);
        for pair in ids.windows(2) {
            let segment = store.add_segment(m.side_a.surface, side_b.surface, pair[0], pair[1]);
            store.segments.consume(&mut store.points, segment);
            chain.segments.push_back(segment);
        }

        if chain.is_valid(store, options.min_chain_length) {
            chains.push(chain);
        } else {
            diagnostics.invalid_chains_discarded += 1;
        }
    }

    diagnostics.border_chains_loaded += chains.len();
    log::debug!("border load: {} border chains from {} matches", chains.len(), matches.len());
    chains
}

/// `ceil(span) * (per_span - 1) + 1`, clamped to `[2, MAX_BORDER_POINTS]`.
fn border_point_count(span: f64, per_span: usize) -> usize {
    let whole = if span.is_finite() && span > 0.0 {
        // Saturates for spans beyond `usize`.
        span.ceil() as usize
    } else {
        1
    };
    whole
        .max(1)
        .saturating_mul(per_span.saturating_sub(1))
        .saturating_add(1)
        .clamp(2, MAX_BORDER_POINTS)
}

/// Pairs up coincident border edges of different surfaces.
///
/// Two edges match when `MATCH_SAMPLES` evenly spaced samples coincide
/// within `tolerance`, walking them in the same or opposite direction. Each
/// edge matches at most once; edges left over become single-sided matches.
/// Collapsed edges (poles) are skipped.
#[must_use]
pub fn detect_border_matches(surfaces: &SurfaceSet, tolerance: f64) -> Vec<BorderMatch> {
    let mut edges: Vec<(BorderSide, Vec<Point3>)> = Vec::new();
    for surface in surfaces.ids() {
        for edge in BorderEdge::ALL {
            let Some(curve) = BorderCurve::new(surfaces.get(surface), edge) else {
                log::debug!("border {edge:?} of {surface} is degenerate");
                continue;
            };
            let samples = (0..MATCH_SAMPLES)
                .map(|i| curve.point_at(i as f64 / (MATCH_SAMPLES - 1) as f64))
                .collect();
            edges.push((BorderSide::new(surface, edge), samples));
        }
    }

    let mut matched = vec![false; edges.len()];
    let mut matches = Vec::new();
    for i in 0..edges.len() {
        if matched[i] {
            continue;
        }
        let partner = (i + 1..edges.len()).find(|&j| {
            !matched[j]
                && edges[j].0.surface != edges[i].0.surface
                && samples_coincide(&edges[i].1, &edges[j].1, tolerance)
        });
        matched[i] = true;
        match partner {
            Some(j) => {
                matched[j] = true;
                matches.push(BorderMatch::shared(edges[i].0, edges[j].0));
            }
            None => matches.push(BorderMatch::single(edges[i].0)),
        }
    }

    log::debug!(
        "border detection: {} matches ({} shared)",
        matches.len(),
        matches.iter().filter(|m| m.side_b.is_some()).count()
    );
    matches
}

fn samples_coincide(a: &[Point3], b: &[Point3], tolerance: f64) -> bool {
    let forward = a.iter().zip(b).all(|(p, q)| p.distance_to(*q) <= tolerance);
    forward || a.iter().zip(b.iter().rev()).all(|(p, q)| p.distance_to(*q) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::{MAX_BORDER_POINTS, border_point_count};

    #[test]
    fn point_count_follows_the_span() {
        assert_eq!(border_point_count(1.0, 5), 5);
        assert_eq!(border_point_count(2.5, 5), 13);
        assert_eq!(border_point_count(0.0, 5), 5);
        assert_eq!(border_point_count(f64::NAN, 2), 2);
    }

    #[test]
    fn huge_spans_are_capped() {
        assert_eq!(border_point_count(1e12, 5), MAX_BORDER_POINTS);
        assert_eq!(border_point_count(1e300, 5), MAX_BORDER_POINTS);
        assert_eq!(border_point_count(3.0, usize::MAX), MAX_BORDER_POINTS);
    }
}
