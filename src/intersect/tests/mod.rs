use std::collections::HashSet;

use super::chain::Chain;
use super::options::IntersectOptions;
use super::segment::SegmentId;
use super::store::NetworkStore;
use super::surfaces::{SurfaceId, SurfaceSet};
use crate::geom::{PlaneSurface, Point3, Vec3};

mod test_builder_basic;
mod test_topology_basic;

/// Unit floor `z = 0` and a wall `x = 0.5` spanning `y, z` in `[0, 1] x [-0.5, 0.5]`.
struct Scene {
    surfaces: SurfaceSet,
    store: NetworkStore,
    floor: SurfaceId,
    wall: SurfaceId,
}

impl Scene {
    fn new() -> Self {
        let mut surfaces = SurfaceSet::default();
        let floor = surfaces.insert(Box::new(PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y)));
        let wall = surfaces.insert(Box::new(PlaneSurface::new(
            Point3::new(0.5, 0.0, -0.5),
            Vec3::Y,
            Vec3::Z,
        )));
        Self {
            surfaces,
            store: NetworkStore::default(),
            floor,
            wall,
        }
    }

    /// Adds a segment whose footprints come from projecting both ends.
    fn add(&mut self, a: SurfaceId, b: SurfaceId, p0: Point3, p1: Point3) -> SegmentId {
        let (sa, sb) = (self.surfaces.get(a), self.surfaces.get(b));
        let start = self.store.add_point(p0, a, sa.project(p0), b, sb.project(p0));
        let end = self.store.add_point(p1, a, sa.project(p1), b, sb.project(p1));
        self.store.add_segment(a, b, start, end)
    }

    /// The floor/wall intersection line `x = 0.5, z = 0` cut into `n` pieces.
    fn add_seam(&mut self, n: usize) -> Vec<SegmentId> {
        let at = |i: usize| Point3::new(0.5, i as f64 / n as f64, 0.0);
        (0..n)
            .map(|i| self.add(self.floor, self.wall, at(i), at(i + 1)))
            .collect()
    }
}

fn options() -> IntersectOptions {
    IntersectOptions::default()
}

/// Every point that still carries segments was consumed, and no point id
/// shows up twice across `chains`.
fn assert_points_used_once(store: &NetworkStore, chains: &[Chain]) {
    for (id, point) in store.points().iter() {
        if !point.segments().is_empty() {
            assert!(point.is_used(), "{id} was never consumed");
        }
    }
    let mut seen = HashSet::new();
    for chain in chains {
        for id in chain.point_ids(store) {
            assert!(seen.insert(id), "{id} appears more than once");
        }
    }
}
