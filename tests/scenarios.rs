//! Hand-checked diagrams of small site sets

use approx::assert_abs_diff_eq;
use fortune_voronoi::*;

fn bounded(min: (f64, f64), max: (f64, f64)) -> DiagramConfig {
    DiagramConfigBuilder::new()
        .bounds(DVec2::new(min.0, min.1), DVec2::new(max.0, max.1))
        .unwrap()
        .build()
        .unwrap()
}

/// Endpoints ordered bottom-to-top, then left-to-right
fn normalized(segment: Segment) -> (DVec2, DVec2) {
    let key = |p: DVec2| (p.y, p.x);
    if key(segment.start) <= key(segment.end) {
        (segment.start, segment.end)
    } else {
        (segment.end, segment.start)
    }
}

fn assert_point(actual: DVec2, x: f64, y: f64) {
    assert_abs_diff_eq!(actual.x, x, epsilon = 1e-9);
    assert_abs_diff_eq!(actual.y, y, epsilon = 1e-9);
}

fn assert_euler(diagram: &VoronoiDiagram) {
    let v = diagram.vertex_count() as i64;
    let e = diagram.edge_count() as i64;
    let f = diagram.face_count() as i64;
    assert_eq!(v - e + f, 2, "V={} E={} F={}", v, e, f);
}

#[test]
fn test_two_sites_single_bisector() {
    let sites = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
    let diagram = VoronoiDiagram::build(&sites, &bounded((-5.0, -5.0), (15.0, 5.0))).unwrap();

    assert_eq!(diagram.bounds().min, DVec2::new(-5.0, -5.0));
    assert_eq!(diagram.bounds().max, DVec2::new(15.0, 5.0));
    assert_eq!(diagram.face_count(), 3);
    assert!(diagram.interior_vertices().is_empty());

    let segments = diagram.segments();
    assert_eq!(segments.len(), 1);
    let (low, high) = normalized(segments[0]);
    assert_point(low, 5.0, -5.0);
    assert_point(high, 5.0, 5.0);
    assert!(diagram.bounds().on_boundary(low));
    assert!(diagram.bounds().on_boundary(high));
    assert_eq!(diagram.stats().circle_events_scheduled, 0);
    assert_euler(&diagram);
}

#[test]
fn test_triangle_single_vertex() {
    let sites = [
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(5.0, 10.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    let interior = diagram.interior_vertices();
    assert_eq!(interior.len(), 1);
    assert_point(interior[0], 5.0, 3.75);

    let segments = diagram.segments();
    assert_eq!(segments.len(), 3);
    for segment in segments {
        let touches = segment.start.distance(interior[0]) < 1e-9 || segment.end.distance(interior[0]) < 1e-9;
        assert!(touches, "edge {:?} does not meet the vertex", segment);
    }

    assert_eq!(diagram.stats().circle_events_processed, 1);
    assert_eq!(diagram.face_count(), 4);
    for site in 0..3 {
        assert_eq!(diagram.neighbors(site).unwrap().len(), 2);
    }
    assert_euler(&diagram);
}

#[test]
fn test_square_single_vertex_of_degree_four() {
    let sites = [
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(10.0, 10.0),
        DVec2::new(0.0, 10.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &bounded((-5.0, -5.0), (15.0, 15.0))).unwrap();

    let interior = diagram.interior_vertices();
    assert_eq!(interior.len(), 1);
    assert_point(interior[0], 5.0, 5.0);

    let segments: Vec<(DVec2, DVec2)> = diagram.segments().into_iter().map(normalized).collect();
    assert_eq!(segments.len(), 4);
    // Each edge runs from the centre to the middle of one side
    let far_ends: Vec<DVec2> = segments
        .iter()
        .map(|&(a, b)| if a.distance(interior[0]) < 1e-9 { b } else { a })
        .collect();
    for expected in [
        DVec2::new(5.0, -5.0),
        DVec2::new(-5.0, 5.0),
        DVec2::new(15.0, 5.0),
        DVec2::new(5.0, 15.0),
    ] {
        assert!(
            far_ends.iter().any(|p| p.distance(expected) < 1e-9),
            "no edge reaches {}",
            expected
        );
    }
    assert_euler(&diagram);
}

#[test]
fn test_collinear_sites_parallel_bisectors() {
    let sites: Vec<DVec2> = (0..4).map(|i| DVec2::new(i as f64, 0.0)).collect();
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    assert_eq!(diagram.stats().circle_events_scheduled, 0);
    assert_eq!(diagram.stats().circle_events_processed, 0);
    assert!(diagram.interior_vertices().is_empty());

    let mut xs: Vec<f64> = diagram
        .segments()
        .into_iter()
        .map(|s| {
            assert_abs_diff_eq!(s.start.x, s.end.x, epsilon = 1e-9);
            s.start.x
        })
        .collect();
    xs.sort_by(f64::total_cmp);
    assert_eq!(xs.len(), 3);
    for (x, expected) in xs.iter().zip([0.5, 1.5, 2.5]) {
        assert_abs_diff_eq!(*x, expected, epsilon = 1e-9);
    }
    assert_eq!(diagram.neighbors(1).unwrap(), vec![0, 2]);
    assert_euler(&diagram);
}

#[test]
fn test_vertical_collinear_sites() {
    let sites: Vec<DVec2> = (0..4).map(|i| DVec2::new(0.0, i as f64 * 2.0)).collect();
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    assert_eq!(diagram.stats().circle_events_processed, 0);
    let mut ys: Vec<f64> = diagram
        .segments()
        .into_iter()
        .map(|s| {
            assert_abs_diff_eq!(s.start.y, s.end.y, epsilon = 1e-9);
            s.start.y
        })
        .collect();
    ys.sort_by(f64::total_cmp);
    assert_eq!(ys.len(), 3);
    for (y, expected) in ys.iter().zip([1.0, 3.0, 5.0]) {
        assert_abs_diff_eq!(*y, expected, epsilon = 1e-9);
    }
    assert_euler(&diagram);
}

#[test]
fn test_shared_top_row() {
    let sites = [
        DVec2::new(0.0, 10.0),
        DVec2::new(10.0, 10.0),
        DVec2::new(5.0, 0.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    let interior = diagram.interior_vertices();
    assert_eq!(interior.len(), 1);
    assert_point(interior[0], 5.0, 6.25);
    assert_eq!(diagram.segments().len(), 3);
    assert_euler(&diagram);
}

#[test]
fn test_grid_sites() {
    let sites: Vec<DVec2> = (0..3)
        .flat_map(|row| (0..3).map(move |col| DVec2::new(col as f64 * 4.0, row as f64 * 4.0)))
        .collect();
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    let mut interior = diagram.interior_vertices();
    interior.sort_by(|a, b| (a.y, a.x).partial_cmp(&(b.y, b.x)).unwrap());
    assert_eq!(interior.len(), 4);
    assert_point(interior[0], 2.0, 2.0);
    assert_point(interior[1], 6.0, 2.0);
    assert_point(interior[2], 2.0, 6.0);
    assert_point(interior[3], 6.0, 6.0);

    assert_eq!(diagram.segments().len(), 12);
    assert_eq!(diagram.neighbors(4).unwrap(), vec![1, 3, 5, 7]);
    let centre = diagram.cell(4).unwrap();
    assert_abs_diff_eq!(centre.area(), 16.0, epsilon = 1e-9);
    assert!(!centre.is_boundary);
    assert_euler(&diagram);
}

#[test]
fn test_single_site_owns_rectangle() {
    let diagram = VoronoiDiagram::build(&[DVec2::new(2.0, 3.0)], &bounded((0.0, 0.0), (4.0, 6.0))).unwrap();

    assert_eq!(diagram.face_count(), 2);
    assert_eq!(diagram.vertex_count(), 4);
    assert_eq!(diagram.edge_count(), 4);
    assert!(diagram.segments().is_empty());

    let cell = diagram.cell(0).unwrap();
    assert_abs_diff_eq!(cell.area(), 24.0, epsilon = 1e-12);
    assert!(cell.neighbors.is_empty());
    assert!(cell.is_boundary);
    assert_euler(&diagram);
}

#[test]
fn test_small_rectangle_is_expanded() {
    let sites = [
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(5.0, 10.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &bounded((2.0, 2.0), (3.0, 3.0))).unwrap();
    let bounds = diagram.bounds();
    for &site in &sites {
        assert!(bounds.contains_strictly(site, 0.0));
    }
    assert!(bounds.contains_strictly(DVec2::new(5.0, 3.75), 0.0));
    assert_eq!(diagram.interior_vertices().len(), 1);
}

#[test]
fn test_input_errors() {
    let config = DiagramConfig::default();
    assert_eq!(VoronoiDiagram::build(&[], &config).unwrap_err(), VoronoiError::EmptyInput);

    let err = VoronoiDiagram::build(&[DVec2::ZERO, DVec2::new(f64::INFINITY, 0.0)], &config).unwrap_err();
    assert!(matches!(err, VoronoiError::InvalidSite { index: 1, .. }));

    let err = VoronoiDiagram::build(&[DVec2::ONE, DVec2::ZERO, DVec2::ONE], &config).unwrap_err();
    assert_eq!(err, VoronoiError::DuplicateSite { first: 0, duplicate: 2 });
}

fn assert_sites_in_cells(diagram: &VoronoiDiagram, sites: &[DVec2]) {
    for (i, &site) in sites.iter().enumerate() {
        let cell = diagram.cell(i).unwrap();
        assert!(cell.contains(site), "site {} outside its cell", i);
    }
}

/// Sites on a circle of radius 10 around the origin
fn regular_polygon(n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|k| {
            let angle = std::f64::consts::TAU * k as f64 / n as f64;
            DVec2::new(10.0 * angle.cos(), 10.0 * angle.sin())
        })
        .collect()
}

fn hex_lattice(rows: usize, cols: usize) -> Vec<DVec2> {
    (0..rows)
        .flat_map(|i| {
            (0..cols).map(move |j| DVec2::new(j as f64 + 0.5 * (i % 2) as f64, i as f64 * 3f64.sqrt() / 2.0))
        })
        .collect()
}

#[test]
fn test_rotated_square_meets_at_origin() {
    let sites = [
        DVec2::new(0.0, 10.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(0.0, -10.0),
        DVec2::new(-10.0, 0.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    let interior = diagram.interior_vertices();
    assert_eq!(interior.len(), 1);
    assert_point(interior[0], 0.0, 0.0);

    // The diagonals run into the rectangle's corners
    assert_eq!(diagram.vertex_count(), 5);
    assert_eq!(diagram.edge_count(), 8);
    for site in 0..4 {
        assert_eq!(diagram.neighbors(site).unwrap().len(), 2);
    }
    assert_sites_in_cells(&diagram, &sites);
    assert_euler(&diagram);
}

#[test]
fn test_regular_polygons_share_one_vertex() {
    for n in [6, 7, 8, 10, 12] {
        let sites = regular_polygon(n);
        let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

        let interior = diagram.interior_vertices();
        assert_eq!(interior.len(), 1, "{}-gon has vertices {:?}", n, interior);
        assert_abs_diff_eq!(interior[0].length(), 0.0, epsilon = 1e-9);
        assert_eq!(diagram.segments().len(), n, "{}-gon", n);
        for site in 0..n {
            let mut expected = vec![(site + n - 1) % n, (site + 1) % n];
            expected.sort_unstable();
            assert_eq!(diagram.neighbors(site).unwrap(), expected, "{}-gon site {}", n, site);
        }
        assert_sites_in_cells(&diagram, &sites);
        assert_euler(&diagram);
    }
}

#[test]
fn test_hex_lattice() {
    let sites = hex_lattice(2, 2);
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    let mut interior = diagram.interior_vertices();
    interior.sort_by(|a, b| (a.y, a.x).partial_cmp(&(b.y, b.x)).unwrap());
    assert_eq!(interior.len(), 2);
    assert_point(interior[0], 0.5, 3f64.sqrt() / 6.0);
    assert_point(interior[1], 1.0, 3f64.sqrt() / 3.0);
    assert_eq!(diagram.edge_count(), 13);
    assert_sites_in_cells(&diagram, &sites);
    assert_euler(&diagram);

    let sites = hex_lattice(3, 3);
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();
    assert_eq!(diagram.interior_vertices().len(), 9);
    assert_sites_in_cells(&diagram, &sites);
    assert_euler(&diagram);
}

#[test]
fn test_site_just_above_the_first_row() {
    let sites = [
        DVec2::new(10.0, 1e-10),
        DVec2::new(0.0, 0.0),
        DVec2::new(20.0, 0.0),
    ];
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    assert_eq!(diagram.face_count(), 4);
    assert_eq!(diagram.neighbors(0).unwrap(), vec![1, 2]);
    assert_sites_in_cells(&diagram, &sites);
    assert_euler(&diagram);
}

#[test]
fn test_site_close_to_an_earlier_one() {
    let sites = [
        DVec2::new(0.0, 10.0),
        DVec2::new(-5.0, 5.0),
        DVec2::new(-5.0 + 1e-5, 5.0 - 1e-10),
    ];
    let diagram = VoronoiDiagram::build(&sites, &DiagramConfig::default()).unwrap();

    assert_eq!(diagram.face_count(), 4);
    assert_eq!(diagram.interior_vertices().len(), 1);
    for site in 0..3 {
        assert_eq!(diagram.neighbors(site).unwrap().len(), 2);
    }
    assert_sites_in_cells(&diagram, &sites);
    assert_euler(&diagram);
}
