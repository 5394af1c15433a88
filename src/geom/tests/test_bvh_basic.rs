use crate::geom::bvh::Bvh;
use crate::geom::{BBox, Point3};

fn scattered_points() -> Vec<Point3> {
    (0..40)
        .map(|i| {
            let f = f64::from(i);
            Point3::new((f * 0.37).sin() * 3.0, (f * 0.73).cos() * 2.0, f * 0.05)
        })
        .collect()
}

#[test]
fn bvh_query_bbox_returns_intersecting_primitives() {
    let bboxes = vec![
        BBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
        BBox::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0)),
        BBox::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.5, 2.5, 2.5)),
    ];

    let bvh = Bvh::build_with_leaf_size(&bboxes, 1).expect("bvh build");
    let query = BBox::new(Point3::new(0.75, 0.75, 0.75), Point3::new(0.8, 0.8, 0.8));

    let mut hits = Vec::new();
    bvh.query_bbox(query, |idx| {
        hits.push(idx);
        true
    });
    hits.sort_unstable();

    assert_eq!(hits, vec![0, 2]);
}

#[test]
fn bvh_query_bbox_stops_when_visitor_declines() {
    let bboxes: Vec<BBox> = (0..10)
        .map(|i| BBox::from_point(Point3::new(f64::from(i) * 0.01, 0.0, 0.0)))
        .collect();
    let bvh = Bvh::build_with_leaf_size(&bboxes, 2).expect("bvh build");

    let mut visited = 0;
    bvh.query_bbox(
        BBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)),
        |_| {
            visited += 1;
            false
        },
    );
    assert_eq!(visited, 1);
}

#[test]
fn bvh_nearest_k_matches_brute_force() {
    let points = scattered_points();
    let bvh = Bvh::build_points(&points).expect("bvh build");
    let query = Point3::new(0.3, -0.2, 1.0);

    let hits = bvh.nearest_k(query, 5, f64::INFINITY, |i| {
        Some(points[i].distance_squared_to(query))
    });

    let mut brute: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance_squared_to(query)))
        .collect();
    brute.sort_by(|a, b| a.1.total_cmp(&b.1));
    brute.truncate(5);

    assert_eq!(hits.len(), 5);
    for (got, want) in hits.iter().zip(&brute) {
        assert!((got.1 - want.1).abs() < 1e-12, "{got:?} vs {want:?}");
    }
    assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[test]
fn bvh_nearest_k_respects_radius_and_exclusions() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.1, 0.0, 0.0),
        Point3::new(0.2, 0.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
    ];
    let bvh = Bvh::build_points(&points).expect("bvh build");
    let query = Point3::new(0.0, 0.0, 0.0);

    let hits = bvh.nearest_k(query, 10, 0.15 * 0.15, |i| {
        (i != 0).then(|| points[i].distance_squared_to(query))
    });

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, 1);
}

#[test]
fn bvh_of_nothing_is_none() {
    assert!(Bvh::build(&[]).is_none());
    assert!(Bvh::build_points(&[]).is_none());
}
