//! Links: the 1-simplices of the triangulation.
//!
//! Links are transient. The moves never touch them; they are regenerated in
//! full by [`Universe::update_link_data`](crate::core::universe::Universe::update_link_data)
//! before each measurement and drained again before the next rebuild. A link
//! records its two endpoint vertices and the two triangles it borders.

#![forbid(unsafe_code)]

use crate::core::triangle::TriangleKey;
use crate::core::vertex::{VERTEX_POOL_CAPACITY, VertexKey};
use slotmap::new_key_type;

new_key_type! {
    /// Stable label of a link in its pool.
    pub struct LinkKey;
}

/// Upper bound on live links: `3 · |vertices|` after each rebuild, bounded
/// by three per vertex at full vertex capacity. The pool shares the vertex
/// bound since rebuilds interleave with vertex churn.
pub const LINK_POOL_CAPACITY: usize = VERTEX_POOL_CAPACITY;

/// A link record. For timelike links the initial vertex is the earlier one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Link {
    pub(crate) vi: VertexKey,
    pub(crate) vf: VertexKey,
    pub(crate) tp: TriangleKey,
    pub(crate) tm: TriangleKey,
}

impl Link {
    /// The initial endpoint.
    #[must_use]
    pub fn vertex_initial(&self) -> VertexKey {
        self.vi
    }

    /// The final endpoint.
    #[must_use]
    pub fn vertex_final(&self) -> VertexKey {
        self.vf
    }

    /// The bordering triangle on the plus side.
    #[must_use]
    pub fn triangle_plus(&self) -> TriangleKey {
        self.tp
    }

    /// The bordering triangle on the minus side.
    #[must_use]
    pub fn triangle_minus(&self) -> TriangleKey {
        self.tm
    }
}
