use super::options;
use crate::geom::{PlaneSurface, Point3, UwPoint, Vec3};
use crate::intersect::border::{detect_border_matches, load_border_chains};
use crate::intersect::chain::Chain;
use crate::intersect::diagnostics::IntersectDiagnostics;
use crate::intersect::store::NetworkStore;
use crate::intersect::surfaces::SurfaceSet;
use crate::intersect::topology::resolve_topology;

#[test]
fn endpoint_with_disagreeing_footprints_splits_a_border_once() {
    let mut surfaces = SurfaceSet::default();
    let left = surfaces.insert(Box::new(PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y)));
    let right = surfaces.insert(Box::new(PlaneSurface::new(
        Point3::new(1.0, 0.0, 0.0),
        Vec3::X,
        Vec3::Y,
    )));
    let options = options();
    let mut store = NetworkStore::default();
    let mut diag = IntersectDiagnostics::default();

    let shared = *detect_border_matches(&surfaces, 1e-4)
        .iter()
        .find(|m| m.side_b.is_some())
        .unwrap();
    assert_eq!(shared.side_a.surface, left);
    let borders = load_border_chains(&[shared], &surfaces, &mut store, &options, &mut diag);

    // Lands on the shared edge at y = 0.5 seen from `left`, 4e-4 higher seen
    // from `right`: close enough to split, too far apart to merge.
    let start = store.add_point(
        Point3::new(1.0, 0.5, 0.0),
        left,
        UwPoint::new(1.0, 0.5),
        right,
        UwPoint::new(0.0, 0.5004),
    );
    let end = store.add_point(
        Point3::new(0.5, 0.5, 0.0),
        left,
        UwPoint::new(0.5, 0.5),
        right,
        UwPoint::new(0.5, 0.5),
    );
    let segment = store.add_segment(left, right, start, end);
    let mut chain = Chain::new(left, right, false);
    chain.segments.push_back(segment);

    let network = resolve_topology(borders, vec![chain], &surfaces, &mut store, &options, &mut diag);

    assert_eq!(diag.border_splits, 1);
    let pieces: Vec<&Chain> = network.iter().filter(|c| c.is_border()).collect();
    assert_eq!(pieces.len(), 2);
    for piece in &pieces {
        assert!((piece.length(&store) - 0.5).abs() < 1e-9);
    }
    let cut = pieces[0].last_point(&store).unwrap();
    assert!(store.points().get(cut).position().distance_to(Point3::new(1.0, 0.5, 0.0)) < 1e-12);
}
