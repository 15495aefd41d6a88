//! Complete workflow demonstration for fortune_voronoi

use fortune_voronoi::*;

fn main() -> Result<()> {
    println!("=== fortune_voronoi Complete Demo ===\n");

    // Step 1: Generate sites
    println!("Step 1: Generating sites...");
    let bounds = BoundingBox::new(DVec2::ZERO, DVec2::new(400.0, 300.0));
    let sites = generate_random_sites(500, &bounds, 12345);
    println!("  {} random sites in {} to {}", sites.len(), bounds.min, bounds.max);

    let config = DiagramConfigBuilder::new()
        .bounds(bounds.min, bounds.max)?
        .build()?;

    // Step 2: Relax
    println!("\nStep 2: Lloyd relaxation...");
    let options = LloydOptions {
        max_iterations: 10,
        ..Default::default()
    };
    let sites = lloyd_relaxation(&sites, &config, options)?;

    // Step 3: Build the diagram
    println!("\nStep 3: Building diagram...");
    let diagram = VoronoiDiagram::build(&sites, &config)?;
    let stats = diagram.stats();
    println!("  Vertices: {}", diagram.vertex_count());
    println!("  Edges: {}", diagram.edge_count());
    println!("  Faces: {} (including the outside)", diagram.face_count());
    println!(
        "  Circle events: {} scheduled, {} fired, {} stale",
        stats.circle_events_scheduled, stats.circle_events_processed, stats.stale_events_skipped
    );

    // Step 4: Cell statistics
    println!("\nStep 4: Cells:");
    let cells = diagram.cells();
    let areas: Vec<f64> = cells.iter().map(|c| c.area()).collect();
    let mean = areas.iter().sum::<f64>() / areas.len() as f64;
    let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let max = areas.iter().copied().fold(0.0, f64::max);
    println!("  Area: mean {:.1}, min {:.1}, max {:.1}", mean, min, max);
    let boundary = cells.iter().filter(|c| c.is_boundary).count();
    println!("  {} cells touch the rectangle", boundary);
    let mean_neighbors =
        cells.iter().map(|c| c.neighbor_count()).sum::<usize>() as f64 / cells.len() as f64;
    println!("  Average neighbours: {:.2}", mean_neighbors);

    // Step 5: Queries
    println!("\nStep 5: Queries:");
    #[cfg(feature = "spatial-index")]
    {
        let point = bounds.center();
        let site = diagram.find_cell_at(point);
        let cell = diagram.cell(site)?;
        println!("  Point {} -> site {} at {}", point, site, cell.site);
        println!("  Cell has {} neighbours", cell.neighbor_count());
        println!("  {} cells within 2 hops", diagram.cells_within_hops(site, 2).len());
    }

    // Step 6: Segments for drawing
    println!("\nStep 6: Segments:");
    let view = BoundingBox::new(DVec2::new(100.0, 100.0), DVec2::new(200.0, 200.0));
    let visible = diagram.segments_within(&view);
    let length: f64 = visible.iter().map(|s| s.length()).sum();
    println!("  {} Voronoi edges in total", diagram.segments().len());
    println!("  {} boundary pieces", diagram.boundary_segments().len());
    println!("  {} edges visible in {} to {} (length {:.1})", visible.len(), view.min, view.max, length);

    println!("\n=== Demo Complete ===");
    Ok(())
}
