//! Hausdorff dimension probes: geodesic sphere growth against radius.
//!
//! Each measurement samples a fresh random origin per radius and records the
//! number of simplices on the geodesic sphere of that radius. The scaling of
//! the recorded counts with the radius estimates the Hausdorff dimension of
//! the ensemble; the post-processing happens outside this crate.

#![forbid(unsafe_code)]

use super::frame::{Observable, join_tokens};
use super::geodesics;
use rand::Rng;

/// Primal sphere sizes for radii `1..n_slices / 2`, a fresh random vertex
/// origin per radius.
#[must_use]
pub fn hausdorff(file_id: &str) -> Observable {
    Observable::new("hausdorff", file_id, |universe, rng| {
        let max_radius = universe.n_slices() / 2;
        let vertices = universe.vertex_labels();
        let mut counts = Vec::new();
        for radius in 1..max_radius {
            let origin = vertices[rng.random_range(0..vertices.len())];
            counts.push(geodesics::sphere(universe, origin, radius).len());
        }
        Ok(join_tokens(counts))
    })
}

/// Dual sphere sizes for radii `1..n_slices`, a fresh random triangle origin
/// per radius.
#[must_use]
pub fn hausdorff_dual(file_id: &str) -> Observable {
    Observable::new("hausdorff_dual", file_id, |universe, rng| {
        let max_radius = universe.n_slices();
        let triangles = universe.triangle_labels();
        let mut counts = Vec::new();
        for radius in 1..max_radius {
            let origin = triangles[rng.random_range(0..triangles.len())];
            counts.push(geodesics::sphere_dual(universe, origin, radius).len());
        }
        Ok(join_tokens(counts))
    })
}
