use crate::geom::{
    BorderEdge, CylinderSurface, FourPointSurface, PlaneSurface, Point3, Surface, Tolerance,
    UwDomain, UwPoint, Vec3,
};

fn unit_plane() -> PlaneSurface {
    PlaneSurface::new(Point3::ORIGIN, Vec3::X, Vec3::Y)
}

/// Surface with only `point_at`, so every other method runs its default.
struct Saddle;

impl Surface for Saddle {
    fn point_at(&self, u: f64, w: f64) -> Point3 {
        Point3::new(u, w, (u - 0.5) * (w - 0.5))
    }
}

#[test]
fn plane_projection_recovers_parameters() {
    let plane = PlaneSurface::new(
        Point3::new(-1.0, -1.0, 2.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
    );
    let uw = plane.project(Point3::new(0.0, 1.0, 7.0));
    assert!((uw.u - 0.5).abs() < 1e-9);
    assert!((uw.w - 0.5).abs() < 1e-9);
}

#[test]
fn projection_clamps_to_domain() {
    let uw = unit_plane().project(Point3::new(3.0, 0.5, 0.0));
    assert!((uw.u - 1.0).abs() < 1e-12);
    assert!((uw.w - 0.5).abs() < 1e-9);
}

#[test]
fn cylinder_projection_lands_on_surface() {
    let cyl = CylinderSurface::new(Point3::ORIGIN, Vec3::new(0.0, 0.0, 2.0), 1.0).unwrap();
    let target = Point3::new(0.0, 1.3, 0.8);
    let uw = cyl.project(target);
    let on = cyl.point_at_uw(uw);

    let tol = Tolerance::new(1e-6);
    assert!(tol.approx_eq_point3(on, Point3::new(0.0, 1.0, 0.8)), "{on:?}");
    assert!((uw.w - 0.4).abs() < 1e-6);
}

#[test]
fn cylinder_seam_points_coincide() {
    let cyl = CylinderSurface::new(Point3::ORIGIN, Vec3::Z, 2.0).unwrap();
    let tol = Tolerance::new(1e-9);
    assert!(tol.approx_eq_point3(cyl.point_at(0.0, 0.3), cyl.point_at(1.0, 0.3)));
    assert!(CylinderSurface::new(Point3::ORIGIN, Vec3::ZERO, 1.0).is_err());
    assert!(CylinderSurface::new(Point3::ORIGIN, Vec3::Z, -1.0).is_err());
}

#[test]
fn analytic_and_default_derivatives_agree() {
    let patch = FourPointSurface::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 1.0),
    );
    let (du, dw) = patch.partial_derivatives_at(0.3, 0.6);

    struct Wrapped(FourPointSurface);
    impl Surface for Wrapped {
        fn point_at(&self, u: f64, w: f64) -> Point3 {
            self.0.point_at(u, w)
        }
    }
    let (fu, fw) = Wrapped(patch).partial_derivatives_at(0.3, 0.6);

    assert!(du.sub(fu).length() < 1e-5);
    assert!(dw.sub(fw).length() < 1e-5);
}

#[test]
fn default_newton_projection_converges_on_saddle() {
    let target = Saddle.point_at(0.2, 0.7).add_vec(Vec3::new(0.0, 0.0, 1e-3));
    let uw = Saddle.closest_uw(target, UwPoint::new(0.5, 0.5));
    assert!((uw.u - 0.2).abs() < 1e-3);
    assert!((uw.w - 0.7).abs() < 1e-3);

    let normal = Saddle.normal_at(0.5, 0.5).unwrap();
    assert!((normal.z.abs() - 1.0).abs() < 1e-6);
}

#[test]
fn border_edge_classifies_by_relative_gap() {
    let plane = unit_plane();
    assert_eq!(plane.border_edge(UwPoint::new(0.0, 0.4), 1e-6), Some(BorderEdge::UMin));
    assert_eq!(plane.border_edge(UwPoint::new(0.5, 1.0), 1e-6), Some(BorderEdge::WMax));
    assert_eq!(plane.border_edge(UwPoint::new(0.5, 0.5), 1e-6), None);
    // Near a corner the closer edge wins.
    assert_eq!(plane.border_edge(UwPoint::new(1.0, 1e-7), 1e-6), Some(BorderEdge::UMax));
}

#[test]
fn border_edges_form_a_closed_loop() {
    let domain = UwDomain::new(-1.0, 2.0, 0.0, 0.5);
    let ends: Vec<_> = BorderEdge::ALL.iter().map(|e| e.endpoints(&domain)).collect();
    for (i, &(_, end)) in ends.iter().enumerate() {
        let (next_start, _) = ends[(i + 1) % ends.len()];
        assert_eq!(end, next_start);
    }
    assert!((BorderEdge::WMin.span(&domain) - 3.0).abs() < 1e-12);
    assert!((BorderEdge::UMax.span(&domain) - 0.5).abs() < 1e-12);
}
