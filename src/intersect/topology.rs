//! Final topology: cut border chains where intersection chains land on them
//! and cut intersection chains where they cross each other.
//!
//! A chain moves through `Unsplit -> SplitMarked -> Split`: markers are
//! collected first, cleaned up (merged, end markers dropped), and only then
//! applied, so both chains of a crossing are cut at the same location.

use std::collections::HashMap;

use super::chain::Chain;
use super::diagnostics::IntersectDiagnostics;
use super::options::IntersectOptions;
use super::point::PointId;
use super::store::NetworkStore;
use super::surfaces::{SurfaceId, SurfaceSet};
use crate::geom::{Bvh, UwCrossing, UwPoint, segment_box, segment_crossing};

/// Fractions this far outside a segment still count as touching it.
const CROSSING_SLACK: f64 = 1e-9;

/// Resolves border and crossing splits and returns the final chains:
/// border pieces first, then intersection pieces. Invalid fragments are
/// discarded.
pub fn resolve_topology(
    border_chains: Vec<Chain>,
    chains: Vec<Chain>,
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Vec<Chain> {
    let border = split_borders(border_chains, &chains, surfaces, store, options, diagnostics);
    let crossed = split_crossings(chains, surfaces, store, options, diagnostics);

    let mut network = Vec::with_capacity(border.len() + crossed.len());
    for chain in border.into_iter().chain(crossed) {
        if chain.is_valid(store, options.min_chain_length) {
            network.push(chain);
        } else {
            diagnostics.invalid_chains_discarded += 1;
        }
    }
    log::debug!("topology: {} chains in the final network", network.len());
    network
}

/// Cuts each border chain at every intersection-chain endpoint that lands on it.
fn split_borders(
    border_chains: Vec<Chain>,
    chains: &[Chain],
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Vec<Chain> {
    let landing: Vec<PointId> = chains
        .iter()
        .flat_map(|chain| [chain.first_point(store), chain.last_point(store)])
        .flatten()
        .collect();

    let mut pieces = Vec::with_capacity(border_chains.len());
    for mut border in border_chains {
        for &end in &landing {
            // One marker per endpoint: its footprint on side A, else side B.
            let point = store.points.get(end);
            let Some(&footprint) = point
                .footprint_on(border.surface_a)
                .or_else(|| point.footprint_on(border.surface_b))
            else {
                continue;
            };
            if border.add_border_split(footprint, surfaces, store, options) {
                diagnostics.border_splits += 1;
            }
        }
        diagnostics.splits_merged += border.merge_splits(surfaces, options.split_merge_distance);
        pieces.extend(border.sort_and_split(surfaces, store, options));
    }
    log::debug!(
        "topology: {} border pieces after {} border splits",
        pieces.len(),
        diagnostics.border_splits
    );
    pieces
}

/// Parameter-space boxes of one chain's segments on one surface.
struct ChainBoxes {
    bvh: Option<Bvh>,
    traces: Vec<(UwPoint, UwPoint)>,
}

impl ChainBoxes {
    fn build(chain: &Chain, surface: SurfaceId, store: &NetworkStore) -> Self {
        let traces: Vec<(UwPoint, UwPoint)> = chain
            .segments
            .iter()
            .map(|&s| {
                store
                    .segment_uw(s, surface)
                    .unwrap_or((UwPoint::default(), UwPoint::default()))
            })
            .collect();
        let boxes: Vec<_> = traces.iter().map(|&(a, b)| segment_box(a, b)).collect();
        Self {
            bvh: Bvh::build(&boxes),
            traces,
        }
    }
}

/// The surface two intersection chains have in common, if any.
fn shared_surface(x: &Chain, y: &Chain) -> Option<SurfaceId> {
    if y.touches(x.surface_a) {
        Some(x.surface_a)
    } else if y.touches(x.surface_b) {
        Some(x.surface_b)
    } else {
        None
    }
}

/// Marks and cuts every crossing between intersection chains sharing a surface.
fn split_crossings(
    mut chains: Vec<Chain>,
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Vec<Chain> {
    let mut boxes: HashMap<(usize, SurfaceId), ChainBoxes> = HashMap::new();

    for i in 0..chains.len() {
        for j in (i + 1)..chains.len() {
            let Some(surface) = shared_surface(&chains[i], &chains[j]) else {
                continue;
            };
            boxes
                .entry((i, surface))
                .or_insert_with(|| ChainBoxes::build(&chains[i], surface, store));
            boxes
                .entry((j, surface))
                .or_insert_with(|| ChainBoxes::build(&chains[j], surface, store));

            let crossings = find_crossings(&boxes[&(i, surface)], &boxes[&(j, surface)]);
            for (k, l, crossing) in crossings {
                chains[i].add_split(surface, k, crossing.t, crossing.point);
                chains[j].add_split(surface, l, crossing.s, crossing.point);
                diagnostics.crossing_splits += 2;
            }
        }
    }

    let mut pieces = Vec::with_capacity(chains.len());
    for mut chain in chains {
        diagnostics.splits_merged += chain.merge_splits(surfaces, options.split_merge_distance);
        diagnostics.end_splits_removed += chain.remove_end_splits(store, options.end_split_distance);
        pieces.extend(chain.sort_and_split(surfaces, store, options));
    }
    log::debug!(
        "topology: {} intersection pieces after {} crossing markers",
        pieces.len(),
        diagnostics.crossing_splits
    );
    pieces
}

/// Every crossing of a segment of `x` with a segment of `y`, as
/// `(segment in x, segment in y, crossing)`.
fn find_crossings(x: &ChainBoxes, y: &ChainBoxes) -> Vec<(usize, usize, UwCrossing)> {
    let mut found = Vec::new();
    let Some(bvh) = &y.bvh else {
        return found;
    };
    for (k, &(p0, p1)) in x.traces.iter().enumerate() {
        let query = segment_box(p0, p1).expand_by(CROSSING_SLACK);
        bvh.query_bbox(query, |l| {
            let (q0, q1) = y.traces[l];
            if let Some(crossing) = segment_crossing(p0, p1, q0, q1, CROSSING_SLACK) {
                found.push((k, l, crossing));
            }
            true
        });
    }
    found
}
