//! Vertices: the 0-simplices of the triangulation.
//!
//! A vertex carries its time slice and the labels of the two *upward*
//! triangles anchored on it: the UP triangle immediately to its left (the
//! one having this vertex as base-right) and the one immediately to its
//! right (base-left). These two anchors are enough to reach the whole
//! triangle fan around the vertex by walking right-neighbor chains; the
//! [`Universe`](crate::core::universe::Universe) keeps them consistent as
//! moves restitch the strip.

#![forbid(unsafe_code)]

use crate::core::triangle::TriangleKey;
use slotmap::new_key_type;

new_key_type! {
    /// Stable label of a vertex in its pool.
    pub struct VertexKey;
}

/// Upper bound on live vertices in one universe.
pub const VERTEX_POOL_CAPACITY: usize = 10_000_000;

/// A vertex record. Created zero-initialized by the pool; fields are
/// populated by the universe that owns it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    pub(crate) time: usize,
    pub(crate) tl: TriangleKey,
    pub(crate) tr: TriangleKey,
}

impl Vertex {
    /// The time slice this vertex belongs to, in `[0, n_slices)`.
    #[must_use]
    pub fn time(&self) -> usize {
        self.time
    }

    /// The UP triangle having this vertex as its base-right corner.
    #[must_use]
    pub fn triangle_left(&self) -> TriangleKey {
        self.tl
    }

    /// The UP triangle having this vertex as its base-left corner.
    #[must_use]
    pub fn triangle_right(&self) -> TriangleKey {
        self.tr
    }
}
