#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Assembles the curve network of a set of intersecting parametric
//! surfaces: intersection segments are stitched into chains, surface
//! borders are added, both parametric footprints of every point are
//! reconciled and chains are cut wherever they meet.
//!
//! ```ignore
//! let mut ctx = IntersectContext::new(IntersectOptions::default())?;
//! let floor = ctx.add_surface(PlaneSurface::new(origin, Vec3::X, Vec3::Y));
//! let wall = ctx.add_surface(PlaneSurface::new(wall_origin, Vec3::Y, Vec3::Z));
//! for (p0, p1) in segments {
//!     ctx.add_segment(floor, wall, p0, p1)?;
//! }
//! ctx.detect_border_matches();
//! let network = ctx.run()?;
//! for chain in network.intersection_chains() {
//!     println!("{:?}", network.chain_polyline(chain));
//! }
//! ```

pub mod geom;
pub mod intersect;

pub use geom::{
    BorderEdge, CylinderSurface, FourPointSurface, PlaneSurface, Point3, Surface, UwPoint, Vec3,
};
pub use intersect::{
    Chain, CurveNetwork, IntersectContext, IntersectDiagnostics, IntersectError,
    IntersectOptions, SurfaceId,
};
