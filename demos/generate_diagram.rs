//! Builds the diagrams of a few small, hand-picked site sets and prints them

use fortune_voronoi::*;

fn describe(name: &str, sites: &[DVec2], config: &DiagramConfig) -> Result<()> {
    let diagram = VoronoiDiagram::build(sites, config)?;
    let stats = diagram.stats();

    println!("{}:", name);
    println!("  Bounds: {} to {}", diagram.bounds().min, diagram.bounds().max);
    println!(
        "  V={} E={} F={} (V - E + F = {})",
        diagram.vertex_count(),
        diagram.edge_count(),
        diagram.face_count(),
        diagram.vertex_count() as i64 - diagram.edge_count() as i64 + diagram.face_count() as i64
    );
    println!(
        "  Events: {} site, {} circle scheduled, {} fired, {} stale",
        stats.site_events,
        stats.circle_events_scheduled,
        stats.circle_events_processed,
        stats.stale_events_skipped
    );
    for vertex in diagram.interior_vertices() {
        println!("  Voronoi vertex at {}", vertex);
    }
    for segment in diagram.segments() {
        println!("  Edge {} -> {}", segment.start, segment.end);
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    println!("=== fortune_voronoi Scenarios ===\n");

    let strip = DiagramConfigBuilder::new()
        .bounds(DVec2::new(-5.0, -5.0), DVec2::new(15.0, 5.0))?
        .build()?;
    describe(
        "Two sites",
        &[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)],
        &strip,
    )?;

    let defaults = DiagramConfig::default();
    describe(
        "Triangle",
        &[
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(5.0, 10.0),
        ],
        &defaults,
    )?;

    describe(
        "Square (four cocircular sites)",
        &[
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ],
        &defaults,
    )?;

    let collinear: Vec<DVec2> = (0..4).map(|i| DVec2::new(i as f64, 0.0)).collect();
    describe("Collinear sites", &collinear, &defaults)?;

    // Duplicates are rejected unless merged
    let with_duplicate = [
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 3.0),
        DVec2::new(0.0, 0.0),
    ];
    match VoronoiDiagram::build(&with_duplicate, &defaults) {
        Err(err) => println!("Duplicate sites: {}", err),
        Ok(_) => println!("Duplicate sites: unexpectedly accepted"),
    }
    let merge = DiagramConfigBuilder::new()
        .duplicates(DuplicatePolicy::Merge)
        .build()?;
    describe("Duplicate sites, merged", &with_duplicate, &merge)?;

    Ok(())
}
