use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::uw::{UwDomain, UwPoint};

const CLOSEST_UW_ITERATIONS: usize = 32;
const CLOSEST_UW_BACKTRACKS: usize = 6;
const PROJECT_SEED_GRID: usize = 8;

fn orthogonal_unit_vector(reference: Vec3) -> Vec3 {
    let candidate = if reference.x.abs() < reference.y.abs() {
        Vec3::new(0.0, -reference.z, reference.y)
    } else {
        Vec3::new(-reference.z, 0.0, reference.x)
    };

    candidate.normalized().unwrap_or(Vec3::X)
}

/// One of the four parametric edges of a surface's `(u, w)` rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderEdge {
    /// `u == u_min`, running along w.
    UMin,
    /// `u == u_max`, running along w.
    UMax,
    /// `w == w_min`, running along u.
    WMin,
    /// `w == w_max`, running along u.
    WMax,
}

impl BorderEdge {
    /// Edges in boundary-loop order.
    pub const ALL: [Self; 4] = [Self::WMin, Self::UMax, Self::WMax, Self::UMin];

    /// Start and end of the edge in parameter space. Walking the edges in
    /// [`BorderEdge::ALL`] order traverses the boundary as one closed loop.
    #[must_use]
    pub fn endpoints(self, domain: &UwDomain) -> (UwPoint, UwPoint) {
        let d = domain;
        match self {
            Self::WMin => (
                UwPoint::new(d.u_min, d.w_min),
                UwPoint::new(d.u_max, d.w_min),
            ),
            Self::UMax => (
                UwPoint::new(d.u_max, d.w_min),
                UwPoint::new(d.u_max, d.w_max),
            ),
            Self::WMax => (
                UwPoint::new(d.u_max, d.w_max),
                UwPoint::new(d.u_min, d.w_max),
            ),
            Self::UMin => (
                UwPoint::new(d.u_min, d.w_max),
                UwPoint::new(d.u_min, d.w_min),
            ),
        }
    }

    /// Parameter span covered by the running coordinate of this edge.
    #[must_use]
    pub fn span(self, domain: &UwDomain) -> f64 {
        match self {
            Self::WMin | Self::WMax => domain.u_span().abs(),
            Self::UMin | Self::UMax => domain.w_span().abs(),
        }
    }
}

/// A smooth parametric surface taking part in the intersection network.
///
/// Only `point_at` is required. The defaults derive everything else from it
/// by finite differences and Newton iteration; analytic surfaces override
/// `partial_derivatives_at` for speed and accuracy.
pub trait Surface {
    fn point_at(&self, u: f64, w: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> UwDomain {
        UwDomain::unit()
    }

    #[must_use]
    fn point_at_uw(&self, uw: UwPoint) -> Point3 {
        self.point_at(uw.u, uw.w)
    }

    #[must_use]
    fn partial_derivatives_at(&self, u: f64, w: f64) -> (Vec3, Vec3) {
        let d = self.domain();
        let u = u.clamp(d.u_min, d.u_max);
        let w = w.clamp(d.w_min, d.w_max);

        let central = |lo: f64, hi: f64, at: f64, eval: &dyn Fn(f64) -> Point3| {
            let span = hi - lo;
            let h = Tolerance::DERIVATIVE.relative_to(span);
            if !h.is_finite() || h == 0.0 {
                return Vec3::ZERO;
            }
            let a = (at - h).max(lo);
            let b = (at + h).min(hi);
            if a == b {
                return Vec3::ZERO;
            }
            eval(b).sub_point(eval(a)).mul_scalar(1.0 / (b - a))
        };

        let du = central(d.u_min, d.u_max, u, &|s| self.point_at(s, w));
        let dw = central(d.w_min, d.w_max, w, &|s| self.point_at(u, s));
        (du, dw)
    }

    #[must_use]
    fn normal_at(&self, u: f64, w: f64) -> Option<Vec3> {
        let (du, dw) = self.partial_derivatives_at(u, w);
        du.cross(dw).normalized()
    }

    /// Which parametric edge `uw` lies on, if any.
    ///
    /// `tolerance` is relative to the domain span of the coordinate being
    /// tested. When `uw` is near a corner the closer edge wins.
    #[must_use]
    fn border_edge(&self, uw: UwPoint, tolerance: f64) -> Option<BorderEdge> {
        let d = self.domain();
        let su = d.u_span().abs().max(f64::MIN_POSITIVE);
        let sw = d.w_span().abs().max(f64::MIN_POSITIVE);
        let candidates = [
            (BorderEdge::UMin, (uw.u - d.u_min).abs() / su),
            (BorderEdge::UMax, (d.u_max - uw.u).abs() / su),
            (BorderEdge::WMin, (uw.w - d.w_min).abs() / sw),
            (BorderEdge::WMax, (d.w_max - uw.w).abs() / sw),
        ];
        candidates
            .into_iter()
            .filter(|&(_, gap)| gap <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(edge, _)| edge)
    }

    /// Newton projection of `target` onto the surface starting at `guess`.
    ///
    /// Each step solves the 2x2 normal equations of the tangent plane and is
    /// clamped to the domain. Steps that move away from `target` are halved.
    #[must_use]
    fn closest_uw(&self, target: Point3, guess: UwPoint) -> UwPoint {
        let d = self.domain();
        let mut uw = d.clamp(guess);
        let mut dist2 = self.point_at_uw(uw).distance_squared_to(target);

        for _ in 0..CLOSEST_UW_ITERATIONS {
            let p = self.point_at_uw(uw);
            let (du, dw) = self.partial_derivatives_at(uw.u, uw.w);
            let delta = target.sub_point(p);

            let a11 = du.dot(du);
            let a12 = du.dot(dw);
            let a22 = dw.dot(dw);
            let det = a11 * a22 - a12 * a12;
            if !det.is_finite() || det.abs() <= Tolerance::ZERO_LENGTH.relative_to(a11 * a22) {
                break;
            }

            let b1 = du.dot(delta);
            let b2 = dw.dot(delta);
            let mut step_u = (b1 * a22 - b2 * a12) / det;
            let mut step_w = (a11 * b2 - a12 * b1) / det;

            let mut accepted = None;
            for _ in 0..CLOSEST_UW_BACKTRACKS {
                let next = d.clamp(UwPoint::new(uw.u + step_u, uw.w + step_w));
                let next_dist2 = self.point_at_uw(next).distance_squared_to(target);
                if next_dist2 <= dist2 {
                    accepted = Some((next, next_dist2));
                    break;
                }
                step_u *= 0.5;
                step_w *= 0.5;
            }

            let Some((next, next_dist2)) = accepted else {
                break;
            };
            let moved = (next.u - uw.u).abs() + (next.w - uw.w).abs();
            uw = next;
            dist2 = next_dist2;
            if moved <= Tolerance::NEWTON_STEP.eps {
                break;
            }
        }

        uw
    }

    /// Projects `target` with no prior guess: a coarse grid picks the seed,
    /// [`Surface::closest_uw`] polishes it.
    #[must_use]
    fn project(&self, target: Point3) -> UwPoint {
        let d = self.domain();
        let n = PROJECT_SEED_GRID;
        let mut seed = d.at_fraction(0.5, 0.5);
        let mut best = f64::INFINITY;
        for i in 0..=n {
            for j in 0..=n {
                let uw = d.at_fraction(i as f64 / n as f64, j as f64 / n as f64);
                let dist2 = self.point_at_uw(uw).distance_squared_to(target);
                if dist2 < best {
                    best = dist2;
                    seed = uw;
                }
            }
        }
        self.closest_uw(target, seed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plane
// ─────────────────────────────────────────────────────────────────────────────

/// A planar parallelogram patch: `origin + u * u_axis + w * v_axis` over the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    pub origin: Point3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl PlaneSurface {
    #[must_use]
    pub const fn new(origin: Point3, u_axis: Vec3, v_axis: Vec3) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
        }
    }
}

impl Surface for PlaneSurface {
    fn point_at(&self, u: f64, w: f64) -> Point3 {
        self.origin
            .add_vec(self.u_axis.mul_scalar(u))
            .add_vec(self.v_axis.mul_scalar(w))
    }

    fn partial_derivatives_at(&self, _u: f64, _w: f64) -> (Vec3, Vec3) {
        (self.u_axis, self.v_axis)
    }

    fn normal_at(&self, _u: f64, _w: f64) -> Option<Vec3> {
        self.u_axis.cross(self.v_axis).normalized()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cylinder
// ─────────────────────────────────────────────────────────────────────────────

/// An open cylindrical patch. `u` in [0, 1] sweeps the full turn starting at
/// `x_axis`; the seam at `u = 0 / 1` is treated as two ordinary borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSurface {
    pub base: Point3,
    pub axis: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub radius: f64,
}

impl CylinderSurface {
    pub fn new(base: Point3, axis: Vec3, radius: f64) -> Result<Self, String> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err("cylinder radius must be finite and > 0".to_string());
        }

        let axis_dir = axis
            .normalized()
            .ok_or_else(|| "cylinder axis must be non-zero".to_string())?;
        let x_axis = orthogonal_unit_vector(axis_dir);
        let y_axis = axis_dir.cross(x_axis).normalized().unwrap_or(Vec3::Y);

        Ok(Self {
            base,
            axis,
            x_axis,
            y_axis,
            radius,
        })
    }

    fn radial(&self, u: f64) -> (Vec3, Vec3) {
        let angle = std::f64::consts::TAU * u;
        let (sin, cos) = angle.sin_cos();
        let radial = self
            .x_axis
            .mul_scalar(cos)
            .add(self.y_axis.mul_scalar(sin))
            .mul_scalar(self.radius);
        let tangent = self
            .y_axis
            .mul_scalar(cos)
            .sub(self.x_axis.mul_scalar(sin))
            .mul_scalar(self.radius * std::f64::consts::TAU);
        (radial, tangent)
    }
}

impl Surface for CylinderSurface {
    fn point_at(&self, u: f64, w: f64) -> Point3 {
        let (radial, _) = self.radial(u);
        self.base.add_vec(self.axis.mul_scalar(w)).add_vec(radial)
    }

    fn partial_derivatives_at(&self, u: f64, _w: f64) -> (Vec3, Vec3) {
        let (_, tangent) = self.radial(u);
        (tangent, self.axis)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bilinear patch
// ─────────────────────────────────────────────────────────────────────────────

/// Bilinear patch through four corners:
/// - `p00` at (u=0, w=0)
/// - `p10` at (u=1, w=0)
/// - `p01` at (u=0, w=1)
/// - `p11` at (u=1, w=1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourPointSurface {
    pub p00: Point3,
    pub p10: Point3,
    pub p01: Point3,
    pub p11: Point3,
}

impl FourPointSurface {
    #[must_use]
    pub const fn new(p00: Point3, p10: Point3, p01: Point3, p11: Point3) -> Self {
        Self { p00, p10, p01, p11 }
    }
}

impl Surface for FourPointSurface {
    fn point_at(&self, u: f64, w: f64) -> Point3 {
        let lower = self.p00.lerp(self.p10, u);
        let upper = self.p01.lerp(self.p11, u);
        lower.lerp(upper, w)
    }

    fn partial_derivatives_at(&self, u: f64, w: f64) -> (Vec3, Vec3) {
        let du = self
            .p10
            .sub_point(self.p00)
            .mul_scalar(1.0 - w)
            .add(self.p11.sub_point(self.p01).mul_scalar(w));
        let dw = self
            .p01
            .sub_point(self.p00)
            .mul_scalar(1.0 - u)
            .add(self.p11.sub_point(self.p10).mul_scalar(u));
        (du, dw)
    }
}
