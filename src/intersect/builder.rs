//! Greedy stitching of unordered segments into oriented chains.
//!
//! Endpoints computed by different surface-pair evaluations are close but
//! not bit-identical, so continuations are found by 3-D proximity through a
//! k-nearest query. Proximity alone is ambiguous where three or more
//! surfaces meet. A candidate only qualifies if it carries footprints on
//! both of the growing chain's surfaces.

use super::chain::Chain;
use super::diagnostics::IntersectDiagnostics;
use super::options::IntersectOptions;
use super::point::{PointId, PointIndex};
use super::segment::SegmentId;
use super::store::NetworkStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

/// A continuation found next to one end of a chain.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: PointId,
    segment: SegmentId,
}

/// Stitches every segment of `store` into chains; each segment is used once.
///
/// Invalid chains are discarded, but their points stay consumed so no later
/// chain can pick them up.
pub fn build_chains(
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Vec<Chain> {
    let index = PointIndex::build(&store.points);
    log::debug!("chain build: {} indexed points", index.len());

    let mut chains = Vec::new();
    let seeds: Vec<PointId> = store.points.ids().collect();
    for seed in seeds {
        let point = store.points.get(seed);
        if point.is_used() {
            continue;
        }
        let Some(&segment) = point.segments().first() else {
            continue;
        };
        if store.segments.get(segment).is_used() {
            continue;
        }

        let (a, b) = store.segments.get(segment).surfaces();
        store.segments.consume(&mut store.points, segment);
        let mut chain = Chain::new(a, b, false);
        chain.segments.push_back(segment);

        expand_chain(&mut chain, &index, store, options);
        diagnostics.interior_points_merged += chain.merge_interior_points(store);

        if chain.is_valid(store, options.min_chain_length) {
            chains.push(chain);
        } else {
            log::trace!("discarding degenerate chain seeded at {seed}");
            diagnostics.invalid_chains_discarded += 1;
        }
    }

    diagnostics.chains_built += chains.len();
    log::debug!("chain build: {} chains", chains.len());
    chains
}

/// Grows `chain` at the front until that fails, then at the back.
fn expand_chain(
    chain: &mut Chain,
    index: &PointIndex,
    store: &mut NetworkStore,
    options: &IntersectOptions,
) {
    let mut end = End::Front;
    let mut first_step = true;

    loop {
        let Some(at) = (match end {
            End::Front => chain.first_point(store),
            End::Back => chain.last_point(store),
        }) else {
            return;
        };

        let Some(candidate) = find_continuation(chain, at, index, store, options) else {
            match end {
                End::Front => {
                    end = End::Back;
                    first_step = false;
                    continue;
                }
                End::Back => return,
            }
        };

        if first_step {
            orient_seed(chain, candidate, store);
            first_step = false;
        }

        match end {
            End::Front => chain.join_front(store, candidate.segment),
            End::Back => chain.join_back(store, candidate.segment),
        }
        store.segments.consume(&mut store.points, candidate.segment);
    }
}

/// On the first front step the match may actually continue the seed from
/// its back (short seeds put both ends in the same neighborhood). Reversing
/// the seed then lets the match attach at the front without turning the
/// whole chain around.
fn orient_seed(chain: &Chain, candidate: Candidate, store: &mut NetworkStore) {
    let Some(&seed) = chain.segments.front() else {
        return;
    };
    let seg = store.segments.get(seed);
    let at = store.points.get(candidate.point).position();
    let to_front = store.points.get(seg.start()).position().distance_squared_to(at);
    let to_back = store.points.get(seg.end()).position().distance_squared_to(at);
    if to_back < to_front {
        log::trace!("reversing seed {seed} to continue from its back");
        store.segments.flip(seed);
    }
}

/// Nearest acceptable neighbor of `at`.
///
/// Eligibility is decided inside the k-nearest query: the point itself,
/// consumed points, points of another surface pair and points whose
/// segment is already taken are never counted against `neighbor_count`.
fn find_continuation(
    chain: &Chain,
    at: PointId,
    index: &PointIndex,
    store: &NetworkStore,
    options: &IntersectOptions,
) -> Option<Candidate> {
    let position = store.points.get(at).position();
    let (a, b) = chain.surfaces();
    let open_segment = |id: PointId| {
        let point = store.points.get(id);
        if id == at || point.is_used() || !point.has_footprints_on(a, b) {
            return None;
        }
        let &segment = point.segments().first()?;
        (!store.segments.get(segment).is_used()).then_some(segment)
    };

    let (point, _) = index
        .nearest(position, options.neighbor_count, options.match_distance, |id| {
            open_segment(id).is_some()
        })
        .into_iter()
        .next()?;
    let segment = open_segment(point)?;
    Some(Candidate { point, segment })
}
