//! Fortune's sweepline construction
//!
//! Builds the diagram in four stages: validate and deduplicate the input
//! sites, sweep them into a partial half-edge structure, clip that structure
//! against the bounding rectangle, and hand the closed result to
//! [`crate::diagram::VoronoiDiagram`].

pub mod kernel;

pub(crate) mod beachline;
pub(crate) mod clip;
pub(crate) mod dcel;
pub(crate) mod events;
pub(crate) mod sweep;

pub use sweep::SweepStats;

use glam::DVec2;

use crate::config::{DiagramConfig, DuplicatePolicy};
use crate::error::{Result, VoronoiError};
use crate::util::{find_root, union, Timed};

/// Output of a full construction, before assembly into the public diagram
#[derive(Debug)]
pub(crate) struct Construction {
    /// Distinct sites; face `i` belongs to `sites[i]`
    pub sites: Vec<DVec2>,
    /// For every input site, the index of its distinct site
    pub site_faces: Vec<usize>,
    pub clipped: clip::ClipOutput,
    pub stats: SweepStats,
}

/// Run the sweep and the clipper over `input`
pub(crate) fn construct(input: &[DVec2], config: &DiagramConfig) -> Result<Construction> {
    let _timer = Timed::info("Voronoi construction");

    let (sites, site_faces) = prepare_sites(input, config.duplicates)?;
    let output = sweep::Sweep::new(&sites).run();
    let mut stats = output.stats;
    let clipped = clip::clip_to_box(output, &sites, config.bounds, config.margin)?;
    stats.merged_vertices = clipped.merged_vertices;

    log::info!(
        "built diagram: {} sites ({} distinct), {} vertices, {} edges, {} circle events",
        input.len(),
        sites.len(),
        clipped.dcel.vertices().len(),
        clipped.dcel.edge_count(),
        stats.circle_events_processed
    );
    Ok(Construction {
        sites,
        site_faces,
        clipped,
        stats,
    })
}

/// Reject non-finite input and resolve coincident sites
///
/// Returns the distinct sites in order of first occurrence, and for each
/// input site the index of its distinct representative.
fn prepare_sites(input: &[DVec2], policy: DuplicatePolicy) -> Result<(Vec<DVec2>, Vec<usize>)> {
    if input.is_empty() {
        return Err(VoronoiError::EmptyInput);
    }
    if let Some(index) = input.iter().position(|p| !p.is_finite()) {
        return Err(VoronoiError::InvalidSite {
            index,
            reason: "coordinate is not finite",
        });
    }

    // Sites closer than the distance tolerance are also close in y, so each
    // site only needs comparing with its predecessors in a narrow y window.
    let mut order: Vec<usize> = (0..input.len()).collect();
    order.sort_by(|&a, &b| input[a].y.total_cmp(&input[b].y).then_with(|| a.cmp(&b)));
    let extent = input.iter().map(|p| p.abs().max_element()).fold(0.0, f64::max);
    let window = kernel::scaled(kernel::DISTANCE_TOLERANCE, extent);

    let mut representative: Vec<usize> = (0..input.len()).collect();
    for k in 1..order.len() {
        let p = input[order[k]];
        for &j in order[..k].iter().rev() {
            if p.y - input[j].y > window {
                break;
            }
            if kernel::points_coincide(p, input[j]) {
                union(&mut representative, order[k], j);
            }
        }
    }
    for i in 0..input.len() {
        representative[i] = find_root(&mut representative, i);
    }

    if let Some(duplicate) = (0..input.len()).find(|&i| representative[i] != i) {
        let first = representative[duplicate];
        match policy {
            DuplicatePolicy::Reject => return Err(VoronoiError::DuplicateSite { first, duplicate }),
            DuplicatePolicy::Merge => {
                let merged = (0..input.len()).filter(|&i| representative[i] != i).count();
                log::debug!("merging {} coincident sites into earlier ones", merged);
            }
        }
    }

    let mut sites = Vec::with_capacity(input.len());
    let mut site_faces = vec![0; input.len()];
    for i in 0..input.len() {
        let rep = representative[i];
        if rep == i {
            site_faces[i] = sites.len();
            sites.push(input[i]);
        } else {
            site_faces[i] = site_faces[rep];
        }
    }
    Ok((sites, site_faces))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_rejects_empty_and_nan() {
        assert_eq!(
            prepare_sites(&[], DuplicatePolicy::Reject).unwrap_err(),
            VoronoiError::EmptyInput
        );
        let err = prepare_sites(
            &[DVec2::new(0.0, 0.0), DVec2::new(f64::NAN, 1.0)],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, VoronoiError::InvalidSite { index: 1, .. }));
    }

    #[test]
    fn test_prepare_rejects_duplicates() {
        let sites = [
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(1.0, 1.0),
        ];
        assert_eq!(
            prepare_sites(&sites, DuplicatePolicy::Reject).unwrap_err(),
            VoronoiError::DuplicateSite { first: 0, duplicate: 2 }
        );
    }

    #[test]
    fn test_prepare_merges_duplicates() {
        let sites = [
            DVec2::new(3.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(5.0, 5.0),
        ];
        let (distinct, faces) = prepare_sites(&sites, DuplicatePolicy::Merge).unwrap();
        assert_eq!(distinct, vec![sites[0], sites[1], sites[3]]);
        assert_eq!(faces, vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_prepare_finds_coincident_sites_across_rows() {
        // A distinct site sorts between the two coincident ones
        let sites = [
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 5e-13),
            DVec2::new(0.0, 1e-12),
        ];
        assert_eq!(
            prepare_sites(&sites, DuplicatePolicy::Reject).unwrap_err(),
            VoronoiError::DuplicateSite { first: 0, duplicate: 2 }
        );
        let (distinct, faces) = prepare_sites(&sites, DuplicatePolicy::Merge).unwrap();
        assert_eq!(distinct, vec![sites[0], sites[1]]);
        assert_eq!(faces, vec![0, 1, 0]);
    }

    #[test]
    fn test_prepare_reports_earliest_repeat() {
        let sites = [
            DVec2::new(9.0, 9.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(9.0, 9.0),
        ];
        assert_eq!(
            prepare_sites(&sites, DuplicatePolicy::Reject).unwrap_err(),
            VoronoiError::DuplicateSite { first: 1, duplicate: 2 }
        );
    }
}
