use super::core::{Point3, Tolerance, Vec3};
use super::surface::{BorderEdge, Surface};
use super::uw::{UwPoint, project_onto_segment};

const CLOSEST_PARAM_ITERATIONS: usize = 32;
const CLOSEST_PARAM_SAMPLES: usize = 16;
const DEGENERATE_EDGE_SAMPLES: usize = 8;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let (a, b) = self.domain();
        let span = b - a;
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        let h = Tolerance::DERIVATIVE.relative_to(span);
        if !h.is_finite() || h == 0.0 {
            return Vec3::ZERO;
        }

        let t0 = (t - h).max(a);
        let t1 = (t + h).min(b);
        if t1 == t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    /// Parameter of the point on the curve closest to `target`.
    ///
    /// Gauss-Newton from `guess`, clamped to the domain. A coarse scan of the
    /// domain replaces the guess when it is worse than the best sample.
    #[must_use]
    fn closest_param(&self, target: Point3, guess: f64) -> f64 {
        let (a, b) = self.domain();
        let mut t = guess.clamp(a, b);
        let mut best = self.point_at(t).distance_squared_to(target);

        for i in 0..=CLOSEST_PARAM_SAMPLES {
            let s = a + (b - a) * (i as f64 / CLOSEST_PARAM_SAMPLES as f64);
            let d2 = self.point_at(s).distance_squared_to(target);
            if d2 < best {
                best = d2;
                t = s;
            }
        }

        for _ in 0..CLOSEST_PARAM_ITERATIONS {
            let tangent = self.derivative_at(t);
            let len2 = tangent.length_squared();
            if len2 <= Tolerance::ZERO_LENGTH.eps_squared() {
                break;
            }
            let step = target.sub_point(self.point_at(t)).dot(tangent) / len2;
            let next = (t + step).clamp(a, b);
            let d2 = self.point_at(next).distance_squared_to(target);
            if d2 > best {
                break;
            }
            let moved = (next - t).abs();
            t = next;
            best = d2;
            if moved <= Tolerance::NEWTON_STEP.eps {
                break;
            }
        }

        t
    }
}

/// The iso-parametric curve along one border edge of a surface.
///
/// `t` in [0, 1] runs from the first to the second endpoint reported by
/// [`BorderEdge::endpoints`].
#[derive(Clone, Copy)]
pub struct BorderCurve<'a> {
    surface: &'a dyn Surface,
    edge: BorderEdge,
    start: UwPoint,
    end: UwPoint,
}

impl std::fmt::Debug for BorderCurve<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BorderCurve")
            .field("edge", &self.edge)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl<'a> BorderCurve<'a> {
    /// Border curve of `edge`, or `None` when the edge collapses to a point
    /// in 3-D (a pole) and has no usable direction.
    #[must_use]
    pub fn new(surface: &'a dyn Surface, edge: BorderEdge) -> Option<Self> {
        let (start, end) = edge.endpoints(&surface.domain());
        let curve = Self {
            surface,
            edge,
            start,
            end,
        };
        (curve.approx_length(DEGENERATE_EDGE_SAMPLES) > Tolerance::DEGENERATE_EDGE.eps)
            .then_some(curve)
    }

    #[must_use]
    pub fn edge(&self) -> BorderEdge {
        self.edge
    }

    #[must_use]
    pub fn uw_at(&self, t: f64) -> UwPoint {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }

    /// Curve parameter of the orthogonal projection of `uw` onto the edge.
    #[must_use]
    pub fn param_of(&self, uw: UwPoint) -> f64 {
        project_onto_segment(uw, self.start, self.end)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Chord length of a uniform polyline through the curve.
    #[must_use]
    pub fn approx_length(&self, segments: usize) -> f64 {
        let n = segments.max(1);
        let mut prev = self.point_at(0.0);
        let mut total = 0.0;
        for i in 1..=n {
            let p = self.point_at(i as f64 / n as f64);
            total += prev.distance_to(p);
            prev = p;
        }
        total
    }
}

impl Curve3 for BorderCurve<'_> {
    fn point_at(&self, t: f64) -> Point3 {
        self.surface.point_at_uw(self.uw_at(t))
    }
}
