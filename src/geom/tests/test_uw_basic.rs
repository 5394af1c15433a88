use crate::geom::{UwDomain, UwPoint, project_onto_segment, segment_box, segment_crossing};

#[test]
fn crossing_of_perpendicular_segments() {
    let hit = segment_crossing(
        UwPoint::new(0.0, 0.5),
        UwPoint::new(1.0, 0.5),
        UwPoint::new(0.25, 0.0),
        UwPoint::new(0.25, 1.0),
        0.0,
    )
    .unwrap();
    assert!((hit.t - 0.25).abs() < 1e-12);
    assert!((hit.s - 0.5).abs() < 1e-12);
    assert!(hit.point.distance(UwPoint::new(0.25, 0.5)) < 1e-12);
}

#[test]
fn touching_segments_count_only_within_slack() {
    let (p0, p1) = (UwPoint::new(0.0, 0.0), UwPoint::new(1.0, 0.0));
    let (q0, q1) = (UwPoint::new(1.0 + 1e-12, -1.0), UwPoint::new(1.0 + 1e-12, 1.0));
    assert!(segment_crossing(p0, p1, q0, q1, 0.0).is_none());
    let hit = segment_crossing(p0, p1, q0, q1, 1e-9).unwrap();
    assert_eq!(hit.t, 1.0);
}

#[test]
fn parallel_segments_never_cross() {
    let a = (UwPoint::new(0.0, 0.0), UwPoint::new(1.0, 0.0));
    let collinear = (UwPoint::new(0.5, 0.0), UwPoint::new(2.0, 0.0));
    let offset = (UwPoint::new(0.0, 0.1), UwPoint::new(1.0, 0.1));
    assert!(segment_crossing(a.0, a.1, collinear.0, collinear.1, 1e-9).is_none());
    assert!(segment_crossing(a.0, a.1, offset.0, offset.1, 1e-9).is_none());
}

#[test]
fn projection_is_unclamped() {
    let t = project_onto_segment(UwPoint::new(2.0, 5.0), UwPoint::new(0.0, 0.0), UwPoint::new(1.0, 0.0));
    assert_eq!(t, Some(2.0));
    let p = UwPoint::new(0.3, 0.3);
    assert_eq!(project_onto_segment(p, p, p), None);
}

#[test]
fn segment_box_spans_both_ends() {
    let b = segment_box(UwPoint::new(0.7, 0.1), UwPoint::new(0.2, 0.9));
    assert_eq!((b.min.x, b.min.y, b.min.z), (0.2, 0.1, 0.0));
    assert_eq!((b.max.x, b.max.y, b.max.z), (0.7, 0.9, 0.0));
}

#[test]
fn domain_slop_and_clamp() {
    let d = UwDomain::unit();
    let outside = UwPoint::new(1.00005, -0.00005);
    assert!(d.contains_with_slop(outside, 1e-4));
    assert!(!d.contains_with_slop(outside, 1e-5));
    assert_eq!(d.clamp(outside), UwPoint::new(1.0, 0.0));
}
