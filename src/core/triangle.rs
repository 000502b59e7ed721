//! Triangles: the 2-simplices of the triangulation.
//!
//! Every triangle spans two adjacent time slices. An [`Orientation::Up`]
//! triangle is a (2,1)-simplex, base-left and base-right vertices on its
//! own slice and apex on the next; an [`Orientation::Down`] triangle is
//! the (1,2) mirror, base on the next slice and apex on its own. The three
//! neighbor labels point left and right along the strip between the two
//! slices and across the spacelike base (`tc`), and are kept bidirectionally
//! consistent by the [`Universe`](crate::core::universe::Universe).

#![forbid(unsafe_code)]

use crate::core::vertex::{VERTEX_POOL_CAPACITY, VertexKey};
use slotmap::new_key_type;

new_key_type! {
    /// Stable label of a triangle in its pool.
    pub struct TriangleKey;
}

/// Upper bound on live triangles: two per vertex (Euler relation for this
/// topology).
pub const TRIANGLE_POOL_CAPACITY: usize = 2 * VERTEX_POOL_CAPACITY;

/// Time orientation of a triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// A (2,1)-simplex: base at `time`, apex at `time + 1`.
    #[default]
    Up,
    /// A (1,2)-simplex: base at `time + 1`, apex at `time`.
    Down,
}

impl Orientation {
    /// Derives the orientation from the times of the base-left vertex and
    /// the apex, accounting for the periodic identification of time.
    ///
    /// An apex on slice 0 under a base deeper than slice 1 wraps forward in
    /// time (the triangle points up across the seam); the mirror case wraps
    /// the other way.
    #[must_use]
    pub(crate) fn from_times(left: usize, apex: usize) -> Self {
        let mut orientation = if left < apex {
            Orientation::Up
        } else {
            Orientation::Down
        };
        if apex == 0 && left > 1 {
            orientation = Orientation::Up;
        }
        if left == 0 && apex > 1 {
            orientation = Orientation::Down;
        }
        orientation
    }
}

/// A triangle record: orientation, base time, three neighbor labels and
/// three vertex labels. Created zero-initialized by the pool; populated by
/// the universe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triangle {
    pub(crate) time: usize,
    pub(crate) orientation: Orientation,
    pub(crate) tl: TriangleKey,
    pub(crate) tr: TriangleKey,
    pub(crate) tc: TriangleKey,
    pub(crate) vl: VertexKey,
    pub(crate) vr: VertexKey,
    pub(crate) vc: VertexKey,
}

impl Triangle {
    /// The time of the base-left vertex.
    #[must_use]
    pub fn time(&self) -> usize {
        self.time
    }

    /// The time orientation.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether this is a (2,1)-simplex.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.orientation == Orientation::Up
    }

    /// Whether this is a (1,2)-simplex.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.orientation == Orientation::Down
    }

    /// Left neighbor along the strip.
    #[must_use]
    pub fn triangle_left(&self) -> TriangleKey {
        self.tl
    }

    /// Right neighbor along the strip.
    #[must_use]
    pub fn triangle_right(&self) -> TriangleKey {
        self.tr
    }

    /// Neighbor across the spacelike base, in the adjacent strip.
    #[must_use]
    pub fn triangle_center(&self) -> TriangleKey {
        self.tc
    }

    /// Base-left vertex.
    #[must_use]
    pub fn vertex_left(&self) -> VertexKey {
        self.vl
    }

    /// Base-right vertex.
    #[must_use]
    pub fn vertex_right(&self) -> VertexKey {
        self.vr
    }

    /// Apex vertex.
    #[must_use]
    pub fn vertex_center(&self) -> VertexKey {
        self.vc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_from_adjacent_times() {
        assert_eq!(Orientation::from_times(0, 1), Orientation::Up);
        assert_eq!(Orientation::from_times(1, 0), Orientation::Down);
        assert_eq!(Orientation::from_times(3, 4), Orientation::Up);
        assert_eq!(Orientation::from_times(4, 3), Orientation::Down);
    }

    #[test]
    fn orientation_wraps_across_the_time_seam() {
        // Base on the last slice, apex wrapped to slice 0: still upward.
        assert_eq!(Orientation::from_times(7, 0), Orientation::Up);
        // Base on slice 0, apex on the last slice: downward across the seam.
        assert_eq!(Orientation::from_times(0, 7), Orientation::Down);
        // Two-slice universes have no deeper-than-1 wrap case.
        assert_eq!(Orientation::from_times(1, 0), Orientation::Down);
        assert_eq!(Orientation::from_times(0, 1), Orientation::Up);
    }
}
