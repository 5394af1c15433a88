//! Parameter-space primitives shared by surfaces, footprints and the
//! topology resolver.
//!
//! Every surface is parameterized over its own `(u, w)` rectangle. Crossing
//! detection between chains that share a surface happens entirely in that
//! rectangle, so the 2-D segment helpers live here next to the point type.

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3, Tolerance};

/// A point in a surface's `(u, w)` parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UwPoint {
    /// U parameter value.
    pub u: f64,
    /// W parameter value.
    pub w: f64,
}

impl UwPoint {
    #[must_use]
    pub const fn new(u: f64, w: f64) -> Self {
        Self { u, w }
    }

    /// Check if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.w.is_finite()
    }

    #[must_use]
    pub fn distance_squared(&self, other: UwPoint) -> f64 {
        let du = self.u - other.u;
        let dw = self.w - other.w;
        du * du + dw * dw
    }

    #[must_use]
    pub fn distance(&self, other: UwPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }

    #[must_use]
    pub fn lerp(self, other: UwPoint, t: f64) -> Self {
        Self::new(self.u + (other.u - self.u) * t, self.w + (other.w - self.w) * t)
    }

    /// Lifts the point into the `z = 0` plane so 3-D boxes and the BVH can be
    /// reused for parameter-space queries.
    #[must_use]
    pub const fn to_plane_point(self) -> Point3 {
        Point3::new(self.u, self.w, 0.0)
    }
}

/// A rectangular domain in `(u, w)` parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UwDomain {
    pub u_min: f64,
    pub u_max: f64,
    pub w_min: f64,
    pub w_max: f64,
}

impl UwDomain {
    #[must_use]
    pub const fn new(u_min: f64, u_max: f64, w_min: f64, w_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            w_min,
            w_max,
        }
    }

    /// Create a unit domain [0, 1] x [0, 1].
    #[must_use]
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }

    #[must_use]
    pub fn u_span(&self) -> f64 {
        self.u_max - self.u_min
    }

    #[must_use]
    pub fn w_span(&self) -> f64 {
        self.w_max - self.w_min
    }

    /// Check if this domain is valid (finite, min <= max for both axes).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.u_min.is_finite()
            && self.u_max.is_finite()
            && self.w_min.is_finite()
            && self.w_max.is_finite()
            && self.u_min <= self.u_max
            && self.w_min <= self.w_max
    }

    #[must_use]
    pub fn clamp(&self, uw: UwPoint) -> UwPoint {
        UwPoint::new(
            uw.u.clamp(self.u_min, self.u_max),
            uw.w.clamp(self.w_min, self.w_max),
        )
    }

    /// Whether `uw` lies inside the domain grown by `slop` times each span.
    #[must_use]
    pub fn contains_with_slop(&self, uw: UwPoint, slop: f64) -> bool {
        let du = slop * self.u_span();
        let dw = slop * self.w_span();
        uw.u >= self.u_min - du
            && uw.u <= self.u_max + du
            && uw.w >= self.w_min - dw
            && uw.w <= self.w_max + dw
    }

    /// Maps fractions in [0, 1] onto the domain.
    #[must_use]
    pub fn at_fraction(&self, fu: f64, fw: f64) -> UwPoint {
        UwPoint::new(
            self.u_min + self.u_span() * fu,
            self.w_min + self.w_span() * fw,
        )
    }
}

impl Default for UwDomain {
    fn default() -> Self {
        Self::unit()
    }
}

/// Parameter of the orthogonal projection of `p` onto the line through `a`
/// and `b`, unclamped. Returns `None` for a zero-length segment.
#[must_use]
pub fn project_onto_segment(p: UwPoint, a: UwPoint, b: UwPoint) -> Option<f64> {
    let du = b.u - a.u;
    let dw = b.w - a.w;
    let len2 = du * du + dw * dw;
    if len2 <= Tolerance::ZERO_LENGTH.eps_squared() {
        return None;
    }
    Some(((p.u - a.u) * du + (p.w - a.w) * dw) / len2)
}

/// A proper or touching crossing between two parameter-space segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UwCrossing {
    pub point: UwPoint,
    /// Fraction along the first segment.
    pub t: f64,
    /// Fraction along the second segment.
    pub s: f64,
}

/// Intersects segment `p0-p1` with segment `q0-q1`.
///
/// Parallel and collinear pairs report no crossing. Fractions within `slack`
/// outside [0, 1] still count, then get clamped.
#[must_use]
pub fn segment_crossing(
    p0: UwPoint,
    p1: UwPoint,
    q0: UwPoint,
    q1: UwPoint,
    slack: f64,
) -> Option<UwCrossing> {
    let r = (p1.u - p0.u, p1.w - p0.w);
    let d = (q1.u - q0.u, q1.w - q0.w);
    let denom = r.0 * d.1 - r.1 * d.0;
    let scale = (r.0 * r.0 + r.1 * r.1).sqrt() * (d.0 * d.0 + d.1 * d.1).sqrt();
    if scale <= 0.0 || denom.abs() <= Tolerance::ZERO_LENGTH.relative_to(scale) {
        return None;
    }

    let e = (q0.u - p0.u, q0.w - p0.w);
    let t = (e.0 * d.1 - e.1 * d.0) / denom;
    let s = (e.0 * r.1 - e.1 * r.0) / denom;

    let inside = |v: f64| v >= -slack && v <= 1.0 + slack;
    if !inside(t) || !inside(s) {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    let s = s.clamp(0.0, 1.0);
    Some(UwCrossing {
        point: p0.lerp(p1, t),
        t,
        s,
    })
}

/// Parameter-space box of a segment, lifted to `z = 0`.
#[must_use]
pub fn segment_box(a: UwPoint, b: UwPoint) -> BBox {
    BBox::from_point(a.to_plane_point()).expand_point(b.to_plane_point())
}
