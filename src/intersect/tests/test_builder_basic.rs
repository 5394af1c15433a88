use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{Scene, assert_points_used_once, options};
use crate::geom::{PlaneSurface, Point3, Vec3};
use crate::intersect::builder::build_chains;
use crate::intersect::diagnostics::IntersectDiagnostics;

#[test]
fn shuffled_segments_assemble_into_one_chain() {
    let mut scene = Scene::new();
    let n = 12;
    let mut pieces: Vec<(Point3, Point3)> = (0..n)
        .map(|i| {
            let y0 = f64::from(i) / f64::from(n);
            let y1 = f64::from(i + 1) / f64::from(n);
            (Point3::new(0.5, y0, 0.0), Point3::new(0.5, y1, 0.0))
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(17);
    pieces.shuffle(&mut rng);
    for (p0, p1) in pieces {
        let (p0, p1) = if rng.random_bool(0.5) { (p1, p0) } else { (p0, p1) };
        scene.add(scene.floor, scene.wall, p0, p1);
    }

    let mut diag = IntersectDiagnostics::default();
    let chains = build_chains(&mut scene.store, &options(), &mut diag);

    assert_eq!(chains.len(), 1);
    let chain = &chains[0];
    assert_eq!(chain.segments().len(), n as usize);
    assert!(chain.is_continuous(&scene.store));
    assert!((chain.length(&scene.store) - 1.0).abs() < 1e-12);

    let line = chain.polyline(&scene.store);
    let (first, last) = (line[0], line[line.len() - 1]);
    assert!((first.y - last.y).abs() > 1.0 - 1e-12);
    assert!(line.windows(2).all(|w| (w[1].y - w[0].y).abs() > 0.05));

    assert!(scene.store.segments().iter().all(|(_, s)| s.is_used()));
    assert_points_used_once(&scene.store, &chains);
    assert_eq!(diag.chains_built, 1);
    assert_eq!(diag.interior_points_merged, n as usize - 1);
}

#[test]
fn junction_does_not_join_different_surface_pairs() {
    let mut scene = Scene::new();
    let other_wall = scene.surfaces.insert(Box::new(PlaneSurface::new(
        Point3::new(0.5, 0.5, -0.5),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::Z,
    )));
    let (floor, wall) = (scene.floor, scene.wall);

    // floor/wall along y in [0, 0.5], floor/other_wall along y in [0.5, 1].
    for i in 0..4 {
        let y0 = f64::from(i) * 0.125;
        scene.add(floor, wall, Point3::new(0.5, y0, 0.0), Point3::new(0.5, y0 + 0.125, 0.0));
        scene.add(
            floor,
            other_wall,
            Point3::new(0.5, 0.5 + y0, 0.0),
            Point3::new(0.5, 0.625 + y0, 0.0),
        );
    }

    let mut diag = IntersectDiagnostics::default();
    let chains = build_chains(&mut scene.store, &options(), &mut diag);

    assert_eq!(chains.len(), 2);
    for chain in &chains {
        assert_eq!(chain.segments().len(), 4);
        let (a, b) = chain.surfaces();
        for &s in chain.segments() {
            assert_eq!(scene.store.segments().get(s).surfaces(), (a, b));
        }
        assert!((chain.length(&scene.store) - 0.5).abs() < 1e-12);
    }
    assert_ne!(chains[0].surfaces(), chains[1].surfaces());
}

#[test]
fn three_surfaces_on_one_line_give_one_chain_per_pair() {
    let mut scene = Scene::new();
    // Tilted plane through the same line x = 0.5, z = 0 (at w = 0.5).
    let slope = scene.surfaces.insert(Box::new(PlaneSurface::new(
        Point3::new(0.0, 0.0, 0.5),
        Vec3::Y,
        Vec3::new(1.0, 0.0, -1.0),
    )));
    let (floor, wall) = (scene.floor, scene.wall);
    let n = 8;
    let at = |i: i32| Point3::new(0.5, f64::from(i) / f64::from(n), 0.0);
    // Interleaved so every junction vertex holds six coincident points.
    for i in 0..n {
        scene.add(floor, wall, at(i), at(i + 1));
        scene.add(floor, slope, at(i), at(i + 1));
        scene.add(wall, slope, at(i), at(i + 1));
    }

    let mut diag = IntersectDiagnostics::default();
    let chains = build_chains(&mut scene.store, &options(), &mut diag);

    assert_eq!(chains.len(), 3);
    let mut pairs: Vec<_> = chains.iter().map(|c| c.surfaces()).collect();
    pairs.sort_unstable();
    pairs.dedup();
    assert_eq!(pairs.len(), 3);
    for chain in &chains {
        assert_eq!(chain.segments().len(), n as usize);
        assert!(chain.is_continuous(&scene.store));
        assert!((chain.length(&scene.store) - 1.0).abs() < 1e-12);
    }
    assert_points_used_once(&scene.store, &chains);
}

#[test]
fn separate_runs_of_one_pair_stay_separate() {
    let mut scene = Scene::new();
    let (floor, wall) = (scene.floor, scene.wall);
    scene.add(floor, wall, Point3::new(0.5, 0.0, 0.0), Point3::new(0.5, 0.2, 0.0));
    scene.add(floor, wall, Point3::new(0.5, 0.2, 0.0), Point3::new(0.5, 0.4, 0.0));
    scene.add(floor, wall, Point3::new(0.5, 0.6, 0.0), Point3::new(0.5, 0.8, 0.0));

    let mut diag = IntersectDiagnostics::default();
    let chains = build_chains(&mut scene.store, &options(), &mut diag);

    let mut lengths: Vec<usize> = chains.iter().map(|c| c.segments().len()).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![1, 2]);
}

#[test]
fn too_short_chain_is_discarded() {
    let mut scene = Scene::new();
    let (floor, wall) = (scene.floor, scene.wall);
    scene.add(floor, wall, Point3::new(0.5, 0.3, 0.0), Point3::new(0.5, 0.30001, 0.0));

    let mut diag = IntersectDiagnostics::default();
    let chains = build_chains(&mut scene.store, &options(), &mut diag);

    assert!(chains.is_empty());
    assert_eq!(diag.invalid_chains_discarded, 1);
    assert!(scene.store.segments().iter().all(|(_, s)| s.is_used()));
}
