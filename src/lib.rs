//! # cdt
//!
//! A Monte Carlo sampler for two-dimensional [Causal Dynamical
//! Triangulations](https://en.wikipedia.org/wiki/Causal_dynamical_triangulation)
//! (CDT), a lattice model of quantum gravity.
//!
//! The sampler runs a Markov chain over piecewise-flat 2D spacetimes built
//! from triangles arranged in discrete, periodically identified time slices.
//! Geometries are updated with three local, topology-preserving moves
//! (insert (2,4), delete (4,2), flip (2,2)), accepted or rejected by the
//! Metropolis rule, with a quadratic volume-fixing term that pins the
//! triangle count near a target volume.
//!
//! # Structure
//!
//! - [`core`] holds the triangulation itself: typed object pools with stable
//!   keys ([`core::arena`]), candidate sets with O(1) uniform pick
//!   ([`core::bag`]), the three simplex records ([`core::vertex`],
//!   [`core::triangle`], [`core::link`]) and the [`core::universe::Universe`]
//!   that owns them and applies the moves.
//! - [`simulation`] is the Metropolis driver: move selection, acceptance
//!   ratios, sweeps, and the grow/thermalize/measure phases.
//! - [`observables`] measures the current geometry: breadth-first geodesic
//!   primitives ([`observables::geodesics`]) and the file-backed measurement
//!   frame with the shipped observables (volume profile, Hausdorff
//!   dimensions, Ricci-like curvatures).
//! - [`config`] parses the key-value run configuration consumed by the
//!   `cdt` binary.
//!
//! # Basic usage
//!
//! ```rust
//! use cdt::core::universe::Universe;
//! use cdt::simulation::Simulation;
//!
//! // A minimal torus: 4 slices, 3 vertices per slice, 24 triangles.
//! let mut universe = Universe::create(4, false).unwrap();
//! assert_eq!(universe.triangle_count(), 24);
//! assert_eq!(universe.vertex_count(), 12);
//! universe.validate().unwrap();
//!
//! // Drive the volume to exactly 32 triangles over one measured sweep.
//! let mut simulation = Simulation::new(f64::ln(2.0), 32, 42).unwrap();
//! simulation.set_checkpointing(false);
//! simulation.run(&mut universe, 1, false).unwrap();
//! assert_eq!(universe.triangle_count(), 32);
//! universe.validate().unwrap();
//! ```
//!
//! # Invariants
//!
//! After every accepted move the universe satisfies the manifold invariants
//! checked by [`core::universe::Universe::validate`]:
//!
//! - every vertex belongs to exactly one slice, and the slice sizes sum to
//!   the vertex count;
//! - neighbor pointers are bidirectionally consistent (`t.tl.tr == t`,
//!   `t.tr.tl == t`, `t.tc.tc == t`);
//! - the right-neighbor chain of each slice closes into a cycle of the
//!   slice's size for each orientation;
//! - the flip candidate set holds exactly the triangles whose right neighbor
//!   has the opposite orientation;
//! - the delete candidate set holds exactly the vertices of coordination 4.
//!
//! Violations are programming errors, not runtime conditions: moves commit
//! all bookkeeping atomically before the next attempt starts.
//!
//! # Reproducibility
//!
//! All randomness flows through two logical ChaCha streams derived from one
//! base seed: one for move selection and acceptance, one for observable
//! sampling. Identical seeds reproduce identical runs of one build.

#![forbid(unsafe_code)]

/// The `core` module contains the triangulation data structures and the
/// local Monte Carlo moves that mutate them.
pub mod core {
    pub mod arena;
    pub mod bag;
    /// Collection aliases tuned for label-keyed workloads.
    pub mod collections;
    pub mod link;
    pub mod triangle;
    pub mod universe;
    pub mod vertex;

    pub use arena::*;
    pub use bag::*;
    pub use link::*;
    pub use triangle::*;
    pub use universe::*;
    pub use vertex::*;
}

pub mod config;

/// Measurement of geometric observables on the current configuration.
pub mod observables {
    pub mod geodesics;
    mod frame;
    mod hausdorff;
    mod ricci;
    mod volume_profile;

    pub use frame::{Observable, ObservableError, SampleRng};
    pub use hausdorff::{hausdorff, hausdorff_dual};
    pub use ricci::{ricci, ricci_dual};
    pub use volume_profile::volume_profile;
}

pub mod simulation;

/// Re-exports of the types most runs touch.
pub mod prelude {
    pub use crate::config::{Config, ConfigError};
    pub use crate::core::arena::{Pool, PoolError};
    pub use crate::core::bag::{Bag, BagError};
    pub use crate::core::link::{Link, LinkKey};
    pub use crate::core::triangle::{Orientation, Triangle, TriangleKey};
    pub use crate::core::universe::{Universe, UniverseError, geometry_filename};
    pub use crate::core::vertex::{Vertex, VertexKey};
    pub use crate::observables::{Observable, ObservableError, SampleRng};
    pub use crate::simulation::{Simulation, SimulationError};
}
