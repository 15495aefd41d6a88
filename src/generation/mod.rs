//! Site generation and relaxation
//!
//! Seeded site distributions for demos and tests, and Lloyd's relaxation,
//! which rebuilds the diagram each iteration to even out cell sizes.

mod lloyd;
mod points;

pub use lloyd::{lloyd_relaxation, LloydOptions};
pub use points::{generate_jittered_sites, generate_random_sites};
