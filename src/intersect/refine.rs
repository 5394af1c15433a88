//! Footprint reconciliation for intersection chains.
//!
//! Every point of an intersection chain carries one footprint per parent
//! surface. After refinement both footprints evaluate to the same 3-D
//! location. A footprint on a parametric border is corrected only along
//! its border curve, because an unconstrained 2-D step is ill-posed there.

use super::chain::Chain;
use super::diagnostics::IntersectDiagnostics;
use super::error::IntersectError;
use super::footprint::Footprint;
use super::options::IntersectOptions;
use super::point::PointId;
use super::store::NetworkStore;
use super::surfaces::SurfaceSet;
use crate::geom::{BorderCurve, BorderEdge, Curve3, Point3, Surface, Tolerance, UwPoint, Vec3};

/// Refines every point of `chain` in place.
///
/// Border chains and chains of a surface with itself have nothing to
/// reconcile and are left untouched. Points already within
/// `refine_tolerance` are skipped, so refining twice changes nothing.
pub fn refine_chain(
    chain: &Chain,
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Result<(), IntersectError> {
    if chain.is_border() || chain.surface_a == chain.surface_b {
        return Ok(());
    }
    for point in chain.point_ids(store) {
        refine_point(chain, point, surfaces, store, options, diagnostics)?;
    }
    Ok(())
}

fn refine_point(
    chain: &Chain,
    point: PointId,
    surfaces: &SurfaceSet,
    store: &mut NetworkStore,
    options: &IntersectOptions,
    diagnostics: &mut IntersectDiagnostics,
) -> Result<(), IntersectError> {
    let (a, b) = chain.surfaces();
    let Some((ia, ib)) = store.points.get(point).footprint_pair(a, b) else {
        log::trace!("{point} has no footprints on {a}/{b}; not refined");
        return Ok(());
    };
    let uw_a = store.points.get(point).footprints[ia].uw;
    let uw_b = store.points.get(point).footprints[ib].uw;
    let surf_a = surfaces.get(a);
    let surf_b = surfaces.get(b);

    let before = surf_a.point_at_uw(uw_a).distance_to(surf_b.point_at_uw(uw_b));
    if before <= options.refine_tolerance {
        return Ok(());
    }

    let edge_a = surf_a.border_edge(uw_a, options.border_tolerance);
    let edge_b = surf_b.border_edge(uw_b, options.border_tolerance);
    let corrected = match (edge_a, edge_b) {
        (None, None) => Some(joint_correction(surf_a, uw_a, surf_b, uw_b, options)),
        (Some(ea), None) => border_correction(surf_a, ea, uw_a, surf_b, uw_b, options),
        (None, Some(eb)) => border_correction(surf_b, eb, uw_b, surf_a, uw_a, options)
            .map(|(on_b, on_a)| (on_a, on_b)),
        (Some(ea), Some(eb)) => dual_border_correction(surf_a, ea, uw_a, surf_b, eb, uw_b, options),
    };

    let Some((new_a, new_b)) = corrected else {
        diagnostics.border_classification_failures += 1;
        if options.strict_border_classification {
            return Err(IntersectError::BorderClassification {
                point,
                surface_a: a,
                surface_b: b,
            });
        }
        diagnostics.warn(format!(
            "{point} on {a}/{b} lies on a border without a border curve; refinement skipped"
        ));
        return Ok(());
    };

    let p_a = surf_a.point_at_uw(new_a);
    let p_b = surf_b.point_at_uw(new_b);
    let after = p_a.distance_to(p_b);
    if after.is_nan() || after > before {
        log::trace!("{point}: correction {before:e} -> {after:e} rejected");
        diagnostics.refinements_rejected += 1;
        return Ok(());
    }

    let entry = store.points.get_mut(point);
    entry.footprints[ia] = Footprint::new(a, new_a);
    entry.footprints[ib] = Footprint::new(b, new_b);
    entry.position = p_a.midpoint(p_b);
    diagnostics.points_refined += 1;
    Ok(())
}

/// Both footprints interior: intersect both tangent planes with the plane
/// through the midpoint normal to their common line, then project back.
fn joint_correction(
    surf_a: &dyn Surface,
    mut uw_a: UwPoint,
    surf_b: &dyn Surface,
    mut uw_b: UwPoint,
    options: &IntersectOptions,
) -> (UwPoint, UwPoint) {
    for _ in 0..options.refine_iterations {
        let p_a = surf_a.point_at_uw(uw_a);
        let p_b = surf_b.point_at_uw(uw_b);
        if p_a.distance_to(p_b) <= options.refine_tolerance {
            break;
        }
        let target = match (surf_a.normal_at(uw_a.u, uw_a.w), surf_b.normal_at(uw_b.u, uw_b.w)) {
            (Some(na), Some(nb)) => three_plane_point(na, p_a, nb, p_b),
            _ => None,
        }
        .unwrap_or_else(|| p_a.midpoint(p_b));

        uw_a = surf_a.closest_uw(target, uw_a);
        uw_b = surf_b.closest_uw(target, uw_b);
    }
    (uw_a, uw_b)
}

/// Point on plane `(na, pa)` and plane `(nb, pb)` closest to their midpoint.
/// `None` for (nearly) tangent planes.
fn three_plane_point(na: Vec3, pa: Point3, nb: Vec3, pb: Point3) -> Option<Point3> {
    let line = na.cross(nb);
    let det = line.length_squared();
    if det <= Tolerance::ZERO_LENGTH.eps {
        return None;
    }
    let mid = pa.midpoint(pb).to_vec3();
    let d1 = na.dot(pa.to_vec3());
    let d2 = nb.dot(pb.to_vec3());
    let d3 = line.dot(mid);
    let x = nb
        .cross(line)
        .mul_scalar(d1)
        .add(line.cross(na).mul_scalar(d2))
        .add(na.cross(nb).mul_scalar(d3))
        .mul_scalar(1.0 / det);
    Some(Point3::new(x.x, x.y, x.z))
}

/// One footprint on `edge` of `border_surf`: slide it along the border
/// curve to where the curve pierces `other`, reprojecting `other` each step.
fn border_correction(
    border_surf: &dyn Surface,
    edge: BorderEdge,
    uw_border: UwPoint,
    other: &dyn Surface,
    mut uw_other: UwPoint,
    options: &IntersectOptions,
) -> Option<(UwPoint, UwPoint)> {
    let curve = BorderCurve::new(border_surf, edge)?;
    let mut t = curve.param_of(uw_border);

    for _ in 0..options.refine_iterations {
        let on_curve = curve.point_at(t);
        let on_other = other.point_at_uw(uw_other);
        if on_curve.distance_to(on_other) <= options.refine_tolerance {
            break;
        }
        let next = match other.normal_at(uw_other.u, uw_other.w) {
            Some(n) => {
                let slope = n.dot(curve.derivative_at(t));
                if slope.abs() > Tolerance::ZERO_LENGTH.eps {
                    (t - n.dot(on_curve.sub_point(on_other)) / slope).clamp(0.0, 1.0)
                } else {
                    curve.closest_param(on_other, t)
                }
            }
            None => curve.closest_param(on_other, t),
        };
        t = next;
        uw_other = other.closest_uw(curve.point_at(t), uw_other);
    }

    Some((curve.uw_at(t), uw_other))
}

/// Both footprints on borders: alternate 1-D projections between the two
/// border curves.
fn dual_border_correction(
    surf_a: &dyn Surface,
    edge_a: BorderEdge,
    uw_a: UwPoint,
    surf_b: &dyn Surface,
    edge_b: BorderEdge,
    uw_b: UwPoint,
    options: &IntersectOptions,
) -> Option<(UwPoint, UwPoint)> {
    let curve_a = BorderCurve::new(surf_a, edge_a)?;
    let curve_b = BorderCurve::new(surf_b, edge_b)?;
    let mut ta = curve_a.param_of(uw_a);
    let mut tb = curve_b.param_of(uw_b);

    for _ in 0..options.refine_iterations {
        let pa = curve_a.point_at(ta);
        let pb = curve_b.point_at(tb);
        if pa.distance_to(pb) <= options.refine_tolerance {
            break;
        }
        ta = curve_a.closest_param(pb, ta);
        tb = curve_b.closest_param(curve_a.point_at(ta), tb);
    }

    Some((curve_a.uw_at(ta), curve_b.uw_at(tb)))
}
