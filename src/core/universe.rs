//! The universe: a 2D causal triangulation and its local moves.
//!
//! A [`Universe`] owns the three object pools (vertices, triangles, links),
//! the per-slice vertex counts, and the three candidate sets the Monte Carlo
//! driver picks from:
//!
//! - `triangles_all`: every live triangle (insert-move candidates),
//! - `vertices_four`: every vertex of coordination 4 (delete-move
//!   candidates),
//! - `triangles_flip`: every triangle whose right neighbor has the opposite
//!   orientation (flip-move candidates).
//!
//! Time is periodic with `n_slices` slices; the spatial direction is
//! periodic too (a torus), unless the universe runs in spherical mode, in
//! which case the slices at time `0` and `n_slices - 1` are frozen at three
//! vertices and act as the two poles.
//!
//! The three moves ([`insert_vertex`](Universe::insert_vertex),
//! [`remove_vertex`](Universe::remove_vertex),
//! [`flip_link`](Universe::flip_link)) each mutate a bounded neighborhood
//! in O(1) and restore every global invariant before returning. All pointer
//! updates go through setters that write both sides of a neighbor relation
//! in one step, so no half-stitched state is ever observable.
//!
//! Before each measurement the driver calls [`prepare`](Universe::prepare)
//! to rebuild the adjacency views (vertex neighbors, triangle neighbors and
//! the transient link pool) that the geodesic primitives consume.

#![forbid(unsafe_code)]

use crate::core::arena::{Pool, PoolError};
use crate::core::bag::{Bag, BagError};
use crate::core::collections::{FastHashMap, SmallBuffer};
use crate::core::link::{LINK_POOL_CAPACITY, Link, LinkKey};
use crate::core::triangle::{
    Orientation, TRIANGLE_POOL_CAPACITY, Triangle, TriangleKey,
};
use crate::core::vertex::{VERTEX_POOL_CAPACITY, Vertex, VertexKey};
use slotmap::SecondaryMap;
use std::fmt::Write as _;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;
use tracing::info;

/// Width of every slice in the freshly seeded strip.
const SEED_WIDTH: usize = 3;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by universe construction, moves and persistence.
#[derive(Debug, thiserror::Error)]
pub enum UniverseError {
    /// A pool reached its capacity bound.
    #[error(transparent)]
    Capacity(#[from] PoolError),
    /// A candidate set rejected a bookkeeping update; the geometry and the
    /// sets disagree, which is a programming error in a move.
    #[error("candidate-set bookkeeping failed: {source}")]
    Bookkeeping {
        /// The underlying candidate-set error.
        #[from]
        source: BagError,
    },
    /// An integrity check found the triangulation in an inconsistent state.
    #[error("invariant violated: {message}")]
    InvariantViolation {
        /// What failed, including the offending labels.
        message: String,
    },
    /// Fewer time slices than the periodic orientation rule can support.
    #[error("a universe needs at least 3 time slices, got {n_slices}")]
    TooFewSlices {
        /// The requested slice count.
        n_slices: usize,
    },
    /// A geometry file did not match the persisted format.
    #[error("geometry file {path}: {message}")]
    GeometryFormat {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },
    /// Reading or writing a geometry file failed.
    #[error("geometry I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl UniverseError {
    fn invariant(message: String) -> Self {
        UniverseError::InvariantViolation { message }
    }
}

/// The conventional on-disk location of a checkpointed geometry:
/// `geom/geometry-v{V}-t{S}-s{SEED}[-sphere].dat`.
#[must_use]
pub fn geometry_filename(
    target_volume: usize,
    slices: usize,
    seed: u64,
    sphere: bool,
) -> PathBuf {
    let suffix = if sphere { "-sphere" } else { "" };
    PathBuf::from(format!(
        "geom/geometry-v{target_volume}-t{slices}-s{seed}{suffix}.dat"
    ))
}

// =============================================================================
// UNIVERSE
// =============================================================================

/// A two-dimensional causal triangulation.
#[derive(Clone, Debug)]
pub struct Universe {
    n_slices: usize,
    slice_sizes: Vec<usize>,
    sphere: bool,

    vertices: Pool<VertexKey, Vertex>,
    triangles: Pool<TriangleKey, Triangle>,
    links: Pool<LinkKey, Link>,

    triangles_all: Bag<TriangleKey>,
    vertices_four: Bag<VertexKey>,
    triangles_flip: Bag<TriangleKey>,

    // Measurement views, rebuilt by `prepare`; stale between measurements.
    vertex_list: Vec<VertexKey>,
    triangle_list: Vec<TriangleKey>,
    link_list: Vec<LinkKey>,
    vertex_neighbors: SecondaryMap<VertexKey, Vec<VertexKey>>,
    triangle_neighbors: SecondaryMap<TriangleKey, SmallBuffer<TriangleKey, 3>>,
    vertex_links: SecondaryMap<VertexKey, SmallBuffer<LinkKey, 8>>,
    triangle_links: SecondaryMap<TriangleKey, [LinkKey; 3]>,
}

impl Universe {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Builds the minimal periodic strip: `n_slices` slices of three
    /// vertices each, six triangles per slice pair, everything flippable and
    /// no coordination-4 vertex.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::TooFewSlices`] for `n_slices < 3` (the
    /// periodic orientation rule cannot distinguish up from down across a
    /// two-slice seam) and [`UniverseError::Capacity`] if a pool bound is
    /// hit.
    pub fn create(n_slices: usize, sphere: bool) -> Result<Self, UniverseError> {
        if n_slices < 3 {
            return Err(UniverseError::TooFewSlices { n_slices });
        }

        let mut universe = Self::empty(n_slices, sphere);
        universe.initialize()?;
        Ok(universe)
    }

    fn empty(n_slices: usize, sphere: bool) -> Self {
        Self {
            n_slices,
            slice_sizes: vec![0; n_slices],
            sphere,
            vertices: Pool::with_capacity(VERTEX_POOL_CAPACITY),
            triangles: Pool::with_capacity(TRIANGLE_POOL_CAPACITY),
            links: Pool::with_capacity(LINK_POOL_CAPACITY),
            triangles_all: Bag::new(),
            vertices_four: Bag::new(),
            triangles_flip: Bag::new(),
            vertex_list: Vec::new(),
            triangle_list: Vec::new(),
            link_list: Vec::new(),
            vertex_neighbors: SecondaryMap::new(),
            triangle_neighbors: SecondaryMap::new(),
            vertex_links: SecondaryMap::new(),
            triangle_links: SecondaryMap::new(),
        }
    }

    fn initialize(&mut self) -> Result<(), UniverseError> {
        let w = SEED_WIDTH;
        let t = self.n_slices;

        let mut seed_vertices = Vec::with_capacity(w * t);
        for i in 0..w * t {
            let v = self.vertices.create()?;
            self.vertices[v].time = i / w;
            seed_vertices.push(v);
        }
        self.slice_sizes = vec![w; t];

        // One UP and one DOWN triangle per (slice, column) pair.
        let mut seed_triangles = Vec::with_capacity(2 * w * t);
        for i in 0..t {
            for j in 0..w {
                let up = self.triangles.create()?;
                self.set_vertices(
                    up,
                    seed_vertices[i * w + j],
                    seed_vertices[i * w + (j + 1) % w],
                    seed_vertices[((i + 1) % t) * w + j],
                );
                seed_triangles.push(up);

                let down = self.triangles.create()?;
                self.set_vertices(
                    down,
                    seed_vertices[((i + 1) % t) * w + j],
                    seed_vertices[((i + 1) % t) * w + (j + 1) % w],
                    seed_vertices[i * w + (j + 1) % w],
                );
                seed_triangles.push(down);

                self.triangles_all.add(up)?;
                self.triangles_all.add(down)?;
                // Every seed triangle alternates orientation with its right
                // neighbor, so all of them start flippable.
                self.triangles_flip.add(up)?;
                self.triangles_flip.add(down)?;
            }
        }

        for i in 0..t {
            for j in 0..w {
                let row = 2 * i * w;
                let column = 2 * j;
                self.set_triangles(
                    seed_triangles[row + column],
                    seed_triangles[row + (column + 2 * w - 1) % (2 * w)],
                    seed_triangles[row + column + 1],
                    seed_triangles[(row + column + 2 * t * w - 2 * w + 1) % (2 * t * w)],
                );
                self.set_triangles(
                    seed_triangles[row + column + 1],
                    seed_triangles[row + column],
                    seed_triangles[row + (column + 2) % (2 * w)],
                    seed_triangles[(row + column + 2 * w) % (2 * t * w)],
                );
            }
        }

        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Number of time slices.
    #[must_use]
    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    /// Vertex count per slice.
    #[must_use]
    pub fn slice_sizes(&self) -> &[usize] {
        &self.slice_sizes
    }

    /// Whether the universe runs with spherical boundary slices.
    #[must_use]
    pub fn sphere(&self) -> bool {
        self.sphere
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live triangles (the volume).
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of live links. Meaningful only after
    /// [`prepare`](Self::prepare).
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The insert-move candidate set (every triangle).
    #[must_use]
    pub fn triangles_all(&self) -> &Bag<TriangleKey> {
        &self.triangles_all
    }

    /// The delete-move candidate set (coordination-4 vertices).
    #[must_use]
    pub fn vertices_four(&self) -> &Bag<VertexKey> {
        &self.vertices_four
    }

    /// The flip-move candidate set (orientation-alternating pairs).
    #[must_use]
    pub fn triangles_flip(&self) -> &Bag<TriangleKey> {
        &self.triangles_flip
    }

    /// Dereferences a vertex label. Panics on a destroyed label.
    #[must_use]
    pub fn vertex(&self, v: VertexKey) -> &Vertex {
        &self.vertices[v]
    }

    /// Dereferences a triangle label. Panics on a destroyed label.
    #[must_use]
    pub fn triangle(&self, t: TriangleKey) -> &Triangle {
        &self.triangles[t]
    }

    /// Dereferences a link label. Panics on a destroyed label.
    #[must_use]
    pub fn link(&self, l: LinkKey) -> &Link {
        &self.links[l]
    }

    /// Whether the endpoints of `l` sit on different slices.
    #[must_use]
    pub fn link_is_timelike(&self, l: LinkKey) -> bool {
        let link = &self.links[l];
        self.vertices[link.vi].time != self.vertices[link.vf].time
    }

    // =========================================================================
    // BIDIRECTIONAL SETTERS
    // =========================================================================
    //
    // Every setter writes both sides of the relation before returning, so a
    // caller can never observe a half-updated pointer pair.

    fn set_triangle_right(&mut self, t: TriangleKey, other: TriangleKey) {
        self.triangles[t].tr = other;
        self.triangles[other].tl = t;
    }

    fn set_triangle_center(&mut self, t: TriangleKey, other: TriangleKey) {
        self.triangles[t].tc = other;
        self.triangles[other].tc = t;
    }

    fn set_triangles(
        &mut self,
        t: TriangleKey,
        tl: TriangleKey,
        tr: TriangleKey,
        tc: TriangleKey,
    ) {
        {
            let tri = &mut self.triangles[t];
            tri.tl = tl;
            tri.tr = tr;
            tri.tc = tc;
        }
        self.triangles[tl].tr = t;
        self.triangles[tr].tl = t;
        self.triangles[tc].tc = t;
    }

    /// Replaces the base-right vertex; for an UP triangle this also re-anchors
    /// the vertex's left triangle.
    fn set_vertex_right(&mut self, t: TriangleKey, v: VertexKey) {
        self.triangles[t].vr = v;
        if self.triangles[t].is_up() {
            self.vertices[v].tl = t;
        }
    }

    /// Rewrites all three vertices, recomputing the base time and the
    /// orientation, and re-anchoring the base vertices for an UP triangle.
    fn set_vertices(
        &mut self,
        t: TriangleKey,
        vl: VertexKey,
        vr: VertexKey,
        vc: VertexKey,
    ) {
        let time = self.vertices[vl].time;
        let orientation = Orientation::from_times(time, self.vertices[vc].time);
        {
            let tri = &mut self.triangles[t];
            tri.vl = vl;
            tri.vr = vr;
            tri.vc = vc;
            tri.time = time;
            tri.orientation = orientation;
        }
        if orientation == Orientation::Up {
            self.vertices[vl].tr = t;
            self.vertices[vr].tl = t;
        }
    }

    // =========================================================================
    // MOVES
    // =========================================================================

    /// The (2,4) insert move.
    ///
    /// Splits `t` and its base partner `t.tc` by a new vertex on their
    /// shared base slice, creating one new triangle of each orientation to
    /// the right of the pair. Either member of the pair may be passed; the
    /// new vertex is born with coordination 4 and its label is returned.
    ///
    /// # Errors
    ///
    /// Fails on pool exhaustion or candidate-set bookkeeping inconsistency;
    /// the latter indicates a corrupted geometry.
    pub fn insert_vertex(&mut self, t: TriangleKey) -> Result<VertexKey, UniverseError> {
        let tc = self.triangles[t].tc;
        let vr = self.triangles[t].vr;
        let time = self.triangles[t].time;

        let v = self.vertices.create()?;
        self.vertices[v].time = time;
        self.vertices_four.add(v)?;
        self.slice_sizes[time] += 1;

        // The split pair keeps its left vertices; the new vertex becomes
        // their base-right corner.
        self.set_vertex_right(t, v);
        self.set_vertex_right(tc, v);

        let t1 = self.triangles.create()?;
        let t2 = self.triangles.create()?;
        self.triangles_all.add(t1)?;
        self.triangles_all.add(t2)?;

        let t_apex = self.triangles[t].vc;
        let tc_apex = self.triangles[tc].vc;
        self.set_vertices(t1, v, vr, t_apex);
        self.set_vertices(t2, v, vr, tc_apex);

        let t_right = self.triangles[t].tr;
        let tc_right = self.triangles[tc].tr;
        self.set_triangles(t1, t, t_right, t2);
        self.set_triangles(t2, tc, tc_right, t1);

        // The new triangles inherit their row's old right neighbor, so each
        // is flippable exactly when the triangle it split off from was.
        if self.triangles[t1].orientation != self.triangles[self.triangles[t1].tr].orientation {
            self.triangles_flip.remove(t)?;
            self.triangles_flip.add(t1)?;
        }
        if self.triangles[t2].orientation != self.triangles[self.triangles[t2].tr].orientation {
            self.triangles_flip.remove(tc)?;
            self.triangles_flip.add(t2)?;
        }

        Ok(v)
    }

    /// The (4,2) delete move.
    ///
    /// Collapses the coordination-4 vertex `v`: its right UP triangle and
    /// that triangle's base partner are absorbed into their left neighbors,
    /// and `v` is destroyed. The caller must ensure `v` is in the
    /// coordination-4 candidate set and that its slice can afford to shrink.
    ///
    /// # Errors
    ///
    /// Fails on candidate-set bookkeeping inconsistency, which indicates a
    /// corrupted geometry.
    pub fn remove_vertex(&mut self, v: VertexKey) -> Result<(), UniverseError> {
        let tl = self.vertices[v].tl;
        let tr = self.vertices[v].tr;
        let tlc = self.triangles[tl].tc;
        let trc = self.triangles[tr].tc;

        let trn = self.triangles[tr].tr;
        let trcn = self.triangles[trc].tr;

        self.set_triangle_right(tl, trn);
        self.set_triangle_right(tlc, trcn);

        let vr = self.triangles[tr].vr;
        self.set_vertex_right(tl, vr);
        self.set_vertex_right(tlc, vr);
        self.vertices[vr].tl = tl;

        let time = self.vertices[v].time;
        self.slice_sizes[time] -= 1;

        self.triangles_all.remove(tr)?;
        self.triangles_all.remove(trc)?;
        // The surviving left triangle takes over the removed one's right
        // neighbor, and with it its flippability.
        if self.triangles_flip.contains(tr) {
            self.triangles_flip.remove(tr)?;
            self.triangles_flip.add(tl)?;
        }
        if self.triangles_flip.contains(trc) {
            self.triangles_flip.remove(trc)?;
            self.triangles_flip.add(tlc)?;
        }

        let removed = self.triangles.destroy(tr).is_some();
        debug_assert!(removed);
        let removed = self.triangles.destroy(trc).is_some();
        debug_assert!(removed);

        self.vertices_four.remove(v)?;
        let removed = self.vertices.destroy(v).is_some();
        debug_assert!(removed);

        Ok(())
    }

    /// The (2,2) flip move.
    ///
    /// `t` and its right neighbor must alternate orientation; the timelike
    /// edge they share is rotated, exchanging their apexes and swapping
    /// their center partners. Coordination changes by ±1 for each of the
    /// four corner vertices.
    ///
    /// # Errors
    ///
    /// Fails on candidate-set bookkeeping inconsistency, which indicates a
    /// corrupted geometry.
    pub fn flip_link(&mut self, t: TriangleKey) -> Result<(), UniverseError> {
        let tr = self.triangles[t].tr;
        let tc = self.triangles[t].tc;
        let trc = self.triangles[tr].tc;

        // Re-anchor the base vertices of whichever of the pair is UP; after
        // the rotation the other triangle holds them.
        if self.triangles[t].is_up() {
            let vl = self.triangles[t].vl;
            let vr = self.triangles[t].vr;
            self.vertices[vl].tr = tr;
            self.vertices[vr].tl = tr;
        } else {
            let vl = self.triangles[tr].vl;
            let vr = self.triangles[tr].vr;
            self.vertices[vl].tr = t;
            self.vertices[vr].tl = t;
        }

        self.set_triangle_center(t, trc);
        self.set_triangle_center(tr, tc);

        let vl = self.triangles[t].vl;
        let vr = self.triangles[t].vr;
        let vc = self.triangles[t].vc;
        let vrr = self.triangles[tr].vr;

        self.set_vertices(t, vc, vrr, vl);
        self.set_vertices(tr, vl, vr, vrr);

        // vl and vrr gained a triangle, vr and vc lost one.
        if self.vertices_four.contains(vl) {
            self.vertices_four.remove(vl)?;
        }
        if self.is_four_vertex(vr) && !self.vertices_four.contains(vr) {
            self.vertices_four.add(vr)?;
        }
        if self.is_four_vertex(vc) && !self.vertices_four.contains(vc) {
            self.vertices_four.add(vc)?;
        }
        if self.vertices_four.contains(vrr) {
            self.vertices_four.remove(vrr)?;
        }

        // The pair itself stays flippable; only the outer neighbors change.
        let left = self.triangles[t].tl;
        let left_matches = self.triangles[t].orientation == self.triangles[left].orientation;
        if self.triangles_flip.contains(left) && left_matches {
            self.triangles_flip.remove(left)?;
        } else if !self.triangles_flip.contains(left) && !left_matches {
            self.triangles_flip.add(left)?;
        }

        let right = self.triangles[tr].tr;
        let right_matches = self.triangles[tr].orientation == self.triangles[right].orientation;
        if self.triangles_flip.contains(tr) && right_matches {
            self.triangles_flip.remove(tr)?;
        } else if !self.triangles_flip.contains(tr) && !right_matches {
            self.triangles_flip.add(tr)?;
        }

        Ok(())
    }

    /// Whether `v` has exactly four incident triangles: its two upward
    /// anchors are row-adjacent and so are their base partners.
    #[must_use]
    pub fn is_four_vertex(&self, v: VertexKey) -> bool {
        let vert = &self.vertices[v];
        self.triangles[vert.tl].tr == vert.tr
            && self.triangles[self.triangles[vert.tl].tc].tr == self.triangles[vert.tr].tc
    }

    // =========================================================================
    // INTEGRITY CHECK
    // =========================================================================

    /// Verifies every structural invariant of the triangulation.
    ///
    /// Checks, in order: global counts (slice sizes sum to the vertex count,
    /// twice as many triangles as vertices, candidate sets sized to the
    /// pools); per-triangle liveness, distinctness, orientation/time
    /// consistency, bidirectional neighbor pointers and flip-set membership;
    /// per-vertex anchor consistency and coordination-4 set membership; and
    /// per-slice right-chain closure plus the slice-size floors.
    ///
    /// # Errors
    ///
    /// Returns the first [`UniverseError::InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), UniverseError> {
        self.validate_counts()?;
        self.validate_triangles()?;
        self.validate_vertices()?;
        self.validate_slices()?;
        Ok(())
    }

    fn validate_counts(&self) -> Result<(), UniverseError> {
        let slice_total: usize = self.slice_sizes.iter().sum();
        if slice_total != self.vertices.len() {
            return Err(UniverseError::invariant(format!(
                "slice sizes sum to {slice_total} but {} vertices are live",
                self.vertices.len()
            )));
        }
        if self.triangles.len() != 2 * self.vertices.len() {
            return Err(UniverseError::invariant(format!(
                "{} triangles for {} vertices breaks the 2:1 volume relation",
                self.triangles.len(),
                self.vertices.len()
            )));
        }
        if self.triangles_all.len() != self.triangles.len() {
            return Err(UniverseError::invariant(format!(
                "insert candidate set has {} entries for {} live triangles",
                self.triangles_all.len(),
                self.triangles.len()
            )));
        }
        Ok(())
    }

    fn validate_triangles(&self) -> Result<(), UniverseError> {
        for (t, tri) in self.triangles.iter() {
            for (name, neighbor) in [("tl", tri.tl), ("tr", tri.tr), ("tc", tri.tc)] {
                if !self.triangles.contains(neighbor) {
                    return Err(UniverseError::invariant(format!(
                        "triangle {t:?} has dead {name} neighbor {neighbor:?}"
                    )));
                }
            }
            for (name, corner) in [("vl", tri.vl), ("vr", tri.vr), ("vc", tri.vc)] {
                if !self.vertices.contains(corner) {
                    return Err(UniverseError::invariant(format!(
                        "triangle {t:?} has dead {name} vertex {corner:?}"
                    )));
                }
            }
            if tri.vl == tri.vr || tri.vl == tri.vc || tri.vr == tri.vc {
                return Err(UniverseError::invariant(format!(
                    "triangle {t:?} repeats a vertex: {:?} {:?} {:?}",
                    tri.vl, tri.vr, tri.vc
                )));
            }
            if tri.tl == tri.tr || tri.tl == tri.tc || tri.tr == tri.tc {
                return Err(UniverseError::invariant(format!(
                    "triangle {t:?} repeats a neighbor: {:?} {:?} {:?}",
                    tri.tl, tri.tr, tri.tc
                )));
            }

            if self.triangles[tri.tl].tr != t
                || self.triangles[tri.tr].tl != t
                || self.triangles[tri.tc].tc != t
            {
                return Err(UniverseError::invariant(format!(
                    "triangle {t:?} has one-way neighbor pointers"
                )));
            }

            // A triangle's time is the slice of its base-left vertex; the
            // apex sits one slice forward (UP) or back (DOWN).
            let base = self.vertices[tri.vl].time;
            let apex = self.vertices[tri.vc].time;
            let times_ok = base == tri.time
                && match tri.orientation {
                    Orientation::Up => apex == (tri.time + 1) % self.n_slices,
                    Orientation::Down => {
                        apex == (tri.time + self.n_slices - 1) % self.n_slices
                    }
                };
            if !times_ok || self.vertices[tri.vr].time != base {
                return Err(UniverseError::invariant(format!(
                    "triangle {t:?} at time {} ({:?}) disagrees with vertex times {}/{}/{}",
                    tri.time,
                    tri.orientation,
                    base,
                    self.vertices[tri.vr].time,
                    apex
                )));
            }

            let flippable = tri.orientation != self.triangles[tri.tr].orientation;
            if self.triangles_flip.contains(t) != flippable {
                return Err(UniverseError::invariant(format!(
                    "flip candidate set disagrees with orientation mismatch at {t:?}"
                )));
            }
        }
        Ok(())
    }

    fn validate_vertices(&self) -> Result<(), UniverseError> {
        let step_cap = self.triangles.len() + 1;
        for (v, vert) in self.vertices.iter() {
            for (name, anchor) in [("tl", vert.tl), ("tr", vert.tr)] {
                if !self.triangles.contains(anchor) {
                    return Err(UniverseError::invariant(format!(
                        "vertex {v:?} has dead {name} anchor {anchor:?}"
                    )));
                }
            }
            let left = &self.triangles[vert.tl];
            let right = &self.triangles[vert.tr];
            if !left.is_up() || !right.is_up() || left.vr != v || right.vl != v {
                return Err(UniverseError::invariant(format!(
                    "vertex {v:?} anchors {:?}/{:?} do not flank it on its slice",
                    vert.tl, vert.tr
                )));
            }
            if left.time != vert.time {
                return Err(UniverseError::invariant(format!(
                    "vertex {v:?} at time {} anchored in strip {}",
                    vert.time, left.time
                )));
            }

            let coordination = self.coordination(v, step_cap).ok_or_else(|| {
                UniverseError::invariant(format!(
                    "fan walk around vertex {v:?} did not close"
                ))
            })?;
            let four = coordination == 4;
            if self.vertices_four.contains(v) != four {
                return Err(UniverseError::invariant(format!(
                    "coordination-4 candidate set disagrees at {v:?} (coordination {coordination})"
                )));
            }
        }
        Ok(())
    }

    /// Total coordination of `v`, or `None` if a fan walk exceeds `step_cap`
    /// hops (a broken chain).
    fn coordination(&self, v: VertexKey, step_cap: usize) -> Option<usize> {
        let vert = &self.vertices[v];

        let mut up = 1;
        let mut walker = vert.tl;
        while self.triangles[walker].tr != vert.tr {
            walker = self.triangles[walker].tr;
            up += 1;
            if up > step_cap {
                return None;
            }
        }
        up += 1;

        let mut down = 1;
        let target = self.triangles[vert.tr].tc;
        let mut walker = self.triangles[vert.tl].tc;
        while self.triangles[walker].tr != target {
            walker = self.triangles[walker].tr;
            down += 1;
            if down > step_cap {
                return None;
            }
        }
        down += 1;

        Some(up + down)
    }

    fn validate_slices(&self) -> Result<(), UniverseError> {
        for (time, &size) in self.slice_sizes.iter().enumerate() {
            if size < SEED_WIDTH {
                return Err(UniverseError::invariant(format!(
                    "slice {time} shrank to {size} vertices"
                )));
            }
        }
        if self.sphere
            && (self.slice_sizes[0] != SEED_WIDTH
                || self.slice_sizes[self.n_slices - 1] != SEED_WIDTH)
        {
            return Err(UniverseError::invariant(format!(
                "pole slices must stay at {SEED_WIDTH} vertices, got {} and {}",
                self.slice_sizes[0],
                self.slice_sizes[self.n_slices - 1]
            )));
        }

        // One full right-chain walk per strip: the chain must close after
        // visiting exactly sliceSizes[t] UP and sliceSizes[t+1] DOWN
        // triangles.
        let mut strip_start: Vec<Option<TriangleKey>> = vec![None; self.n_slices];
        for (t, tri) in self.triangles.iter() {
            if tri.is_up() && strip_start[tri.time].is_none() {
                strip_start[tri.time] = Some(t);
            }
        }
        let step_cap = self.triangles.len() + 1;
        for (time, start) in strip_start.iter().enumerate() {
            let Some(start) = *start else {
                return Err(UniverseError::invariant(format!(
                    "strip {time} has no UP triangle"
                )));
            };
            let mut up = 0usize;
            let mut down = 0usize;
            let mut walker = start;
            loop {
                // UP triangles of strip `time` have their base on slice
                // `time`; the interleaved DOWN triangles base on the next
                // slice.
                let tri = &self.triangles[walker];
                let expected_time = match tri.orientation {
                    Orientation::Up => {
                        up += 1;
                        time
                    }
                    Orientation::Down => {
                        down += 1;
                        (time + 1) % self.n_slices
                    }
                };
                if tri.time != expected_time {
                    return Err(UniverseError::invariant(format!(
                        "right chain of strip {time} strayed to a triangle based on slice {} at {walker:?}",
                        tri.time
                    )));
                }
                walker = self.triangles[walker].tr;
                if walker == start {
                    break;
                }
                if up + down > step_cap {
                    return Err(UniverseError::invariant(format!(
                        "right chain of strip {time} does not close"
                    )));
                }
            }
            let expected_down = self.slice_sizes[(time + 1) % self.n_slices];
            if up != self.slice_sizes[time] || down != expected_down {
                return Err(UniverseError::invariant(format!(
                    "strip {time} chain has {up} UP / {down} DOWN triangles, expected {} / {expected_down}",
                    self.slice_sizes[time]
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // ADJACENCY RECONSTRUCTION
    // =========================================================================

    /// Rebuilds every measurement view: vertex neighbors, triangle
    /// neighbors, and the transient link pool.
    ///
    /// # Errors
    ///
    /// Propagates pool exhaustion and the `3 · |vertices|` link-count check.
    pub fn prepare(&mut self) -> Result<(), UniverseError> {
        self.update_vertex_data();
        self.update_triangle_data();
        self.update_link_data()
    }

    /// The vertices of the current configuration, one entry per vertex,
    /// rebuilt by [`prepare`](Self::prepare).
    #[must_use]
    pub fn vertex_labels(&self) -> &[VertexKey] {
        &self.vertex_list
    }

    /// The triangles of the current configuration, rebuilt by
    /// [`prepare`](Self::prepare).
    #[must_use]
    pub fn triangle_labels(&self) -> &[TriangleKey] {
        &self.triangle_list
    }

    /// The links of the current configuration, rebuilt by
    /// [`prepare`](Self::prepare).
    #[must_use]
    pub fn link_labels(&self) -> &[LinkKey] {
        &self.link_list
    }

    /// Every vertex sharing a link with `v` (empty before the first
    /// [`prepare`](Self::prepare)).
    #[must_use]
    pub fn vertex_neighbors_of(&self, v: VertexKey) -> &[VertexKey] {
        self.vertex_neighbors.get(v).map_or(&[], Vec::as_slice)
    }

    /// The dual-adjacent triangles of `t`: three in the bulk, two on a pole
    /// slice of a spherical universe.
    #[must_use]
    pub fn triangle_neighbors_of(&self, t: TriangleKey) -> &[TriangleKey] {
        self.triangle_neighbors
            .get(t)
            .map_or(&[], SmallBuffer::as_slice)
    }

    /// The links incident to `v`.
    #[must_use]
    pub fn links_of_vertex(&self, v: VertexKey) -> &[LinkKey] {
        self.vertex_links.get(v).map_or(&[], SmallBuffer::as_slice)
    }

    /// The three links bordering `t` (left edge, right edge, base).
    #[must_use]
    pub fn links_of_triangle(&self, t: TriangleKey) -> &[LinkKey] {
        self.triangle_links.get(t).map_or(&[], |links| &links[..])
    }

    /// Recollects the vertex list and the primal neighbor fans.
    pub fn update_vertex_data(&mut self) {
        self.vertex_list.clear();
        for t in self.triangles_all.iter() {
            if self.triangles[t].is_up() {
                self.vertex_list.push(self.triangles[t].vl);
            }
        }

        self.vertex_neighbors.clear();
        for i in 0..self.vertex_list.len() {
            let v = self.vertex_list[i];
            let fan = self.collect_vertex_fan(v);
            self.vertex_neighbors.insert(v, fan);
        }
    }

    fn collect_vertex_fan(&self, v: VertexKey) -> Vec<VertexKey> {
        let mut fan = Vec::new();
        let vert = &self.vertices[v];

        if self.sphere {
            if vert.time == 0 {
                // South pole: only the strip above exists.
                let mut tn = vert.tl;
                loop {
                    fan.push(self.triangles[tn].vl);
                    tn = self.triangles[tn].tr;
                    if !self.triangles[tn].is_down() {
                        break;
                    }
                }
                fan.push(self.triangles[tn].vc);
                fan.push(self.triangles[tn].vr);
                return fan;
            } else if vert.time == self.n_slices - 1 {
                // North pole: only the strip below exists.
                let mut tn = self.triangles[vert.tl].tc;
                loop {
                    fan.push(self.triangles[tn].vl);
                    tn = self.triangles[tn].tr;
                    if !self.triangles[tn].is_up() {
                        break;
                    }
                }
                fan.push(self.triangles[tn].vc);
                fan.push(self.triangles[tn].vr);
                return fan;
            }
        }

        // Strip above, left to right: the left spacelike neighbor, then the
        // upper neighbors, closing with the right spacelike neighbor.
        let mut tn = vert.tl;
        loop {
            fan.push(self.triangles[tn].vl);
            tn = self.triangles[tn].tr;
            if !self.triangles[tn].is_down() {
                break;
            }
        }
        fan.push(self.triangles[tn].vc);
        fan.push(self.triangles[tn].vr);

        // Strip below, right to left: the lower neighbors.
        let mut tn = self.triangles[self.triangles[tn].tc].tl;
        while self.triangles[tn].is_up() {
            fan.push(self.triangles[tn].vr);
            tn = self.triangles[tn].tl;
        }
        fan.push(self.triangles[tn].vc);

        fan
    }

    /// Recollects the triangle list and the dual neighbor triples.
    pub fn update_triangle_data(&mut self) {
        self.triangle_list.clear();
        self.triangle_neighbors.clear();
        for t in self.triangles_all.iter() {
            self.triangle_list.push(t);

            let tri = &self.triangles[t];
            let mut neighbors: SmallBuffer<TriangleKey, 3> = SmallBuffer::new();
            let on_south_pole = self.sphere && tri.is_up() && tri.time == 0;
            let on_north_pole =
                self.sphere && tri.is_down() && tri.time == self.n_slices - 1;
            neighbors.push(tri.tl);
            neighbors.push(tri.tr);
            if !on_south_pole && !on_north_pole {
                neighbors.push(tri.tc);
            }
            self.triangle_neighbors.insert(t, neighbors);
        }
    }

    /// Drains the link pool and regenerates one timelike link per triangle
    /// (its left edge) plus one spacelike link per UP triangle (its base).
    /// Requires the vertex and triangle lists rebuilt by
    /// [`update_vertex_data`](Self::update_vertex_data) and
    /// [`update_triangle_data`](Self::update_triangle_data); use
    /// [`prepare`](Self::prepare) for the full sequence.
    ///
    /// # Errors
    ///
    /// Fails on link-pool exhaustion, or with an invariant violation if the
    /// rebuilt link count differs from `3 · |vertices|`.
    pub fn update_link_data(&mut self) -> Result<(), UniverseError> {
        for l in self.link_list.drain(..) {
            self.links.destroy(l);
        }
        self.vertex_links.clear();
        self.triangle_links.clear();
        for &v in &self.vertex_list {
            self.vertex_links.insert(v, SmallBuffer::new());
        }
        for t in self.triangles_all.iter() {
            self.triangle_links.insert(t, [LinkKey::default(); 3]);
        }

        for i in 0..self.triangle_list.len() {
            let t = self.triangle_list[i];
            let tri = self.triangles[t];

            // Timelike link on the left edge, pointing forward in time.
            let ll = self.links.create()?;
            {
                let link = &mut self.links[ll];
                if tri.is_up() {
                    link.vi = tri.vl;
                    link.vf = tri.vc;
                } else {
                    link.vi = tri.vc;
                    link.vf = tri.vl;
                }
                link.tp = tri.tl;
                link.tm = t;
            }
            self.vertex_links[tri.vl].push(ll);
            self.vertex_links[tri.vc].push(ll);
            self.triangle_links[t][0] = ll;
            self.triangle_links[tri.tl][1] = ll;
            self.link_list.push(ll);

            if tri.is_up() {
                // Spacelike link on the base, shared with the center partner.
                let lh = self.links.create()?;
                {
                    let link = &mut self.links[lh];
                    link.vi = tri.vl;
                    link.vf = tri.vr;
                    link.tp = t;
                    link.tm = tri.tc;
                }
                self.vertex_links[tri.vl].push(lh);
                self.vertex_links[tri.vr].push(lh);
                self.triangle_links[t][2] = lh;
                self.triangle_links[tri.tc][2] = lh;
                self.link_list.push(lh);
            }
        }

        if self.links.len() != 3 * self.vertices.len() {
            return Err(UniverseError::invariant(format!(
                "rebuilt {} links for {} vertices, expected exactly 3 per vertex",
                self.links.len(),
                self.vertices.len()
            )));
        }
        Ok(())
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Writes the geometry to `path` in the line-oriented checkpoint format:
    /// the vertex count, one slice time per vertex, the vertex count again
    /// as a sentinel, the triangle count, six dense indices per triangle
    /// (three vertices, three neighbors), and the triangle count sentinel.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors or if a neighbor label cannot be resolved.
    pub fn export_geometry(&self, path: &Path) -> Result<(), UniverseError> {
        let vertex_order: Vec<VertexKey> = self.vertices.labels().collect();
        let mut vertex_index: FastHashMap<VertexKey, usize> = FastHashMap::default();
        for (i, &v) in vertex_order.iter().enumerate() {
            vertex_index.insert(v, i);
        }

        let triangle_order: Vec<TriangleKey> = self.triangles.labels().collect();
        let mut triangle_index: FastHashMap<TriangleKey, usize> = FastHashMap::default();
        for (i, &t) in triangle_order.iter().enumerate() {
            triangle_index.insert(t, i);
        }

        let mut output = String::new();
        let _ = writeln!(output, "{}", vertex_order.len());
        for &v in &vertex_order {
            let _ = writeln!(output, "{}", self.vertices[v].time);
        }
        let _ = writeln!(output, "{}", vertex_order.len());
        let _ = writeln!(output, "{}", triangle_order.len());
        for &t in &triangle_order {
            let tri = &self.triangles[t];
            for corner in [tri.vl, tri.vr, tri.vc] {
                let index = vertex_index.get(&corner).ok_or_else(|| {
                    UniverseError::invariant(format!(
                        "triangle {t:?} references dead vertex {corner:?} during export"
                    ))
                })?;
                let _ = writeln!(output, "{index}");
            }
            for neighbor in [tri.tl, tri.tr, tri.tc] {
                let index = triangle_index.get(&neighbor).ok_or_else(|| {
                    UniverseError::invariant(format!(
                        "triangle {t:?} references dead neighbor {neighbor:?} during export"
                    ))
                })?;
                let _ = writeln!(output, "{index}");
            }
        }
        let _ = writeln!(output, "{}", triangle_order.len());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(output.as_bytes())?;
        writer.flush()?;

        info!(path = %path.display(), "exported geometry");
        Ok(())
    }

    /// Reads a geometry previously written by
    /// [`export_geometry`](Self::export_geometry), verifying both sentinels,
    /// and rebuilds the candidate sets from the loaded triangles.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, malformed files, or if the loaded geometry does
    /// not pass [`validate`](Self::validate).
    pub fn import_geometry(path: &Path, sphere: bool) -> Result<Self, UniverseError> {
        let text = fs::read_to_string(path)?;
        let mut reader = TokenReader {
            tokens: text.split_whitespace(),
            path,
        };

        let n_vertices = reader.next_count("vertex count")?;
        if n_vertices == 0 {
            return Err(reader.format_error("geometry has no vertices".into()));
        }

        let mut universe = Self::empty(1, sphere);
        let mut vertex_order = Vec::with_capacity(n_vertices);
        let mut max_time = 0;
        for _ in 0..n_vertices {
            let time = reader.next_count("vertex time")?;
            let v = universe.vertices.create()?;
            universe.vertices[v].time = time;
            vertex_order.push(v);
            max_time = max_time.max(time);
        }
        let sentinel = reader.next_count("vertex sentinel")?;
        if sentinel != n_vertices {
            return Err(reader.format_error(format!(
                "vertex sentinel {sentinel} does not match count {n_vertices}"
            )));
        }

        universe.n_slices = max_time + 1;
        if universe.n_slices < 3 {
            return Err(UniverseError::TooFewSlices {
                n_slices: universe.n_slices,
            });
        }
        universe.slice_sizes = vec![0; universe.n_slices];
        for &v in &vertex_order {
            universe.slice_sizes[universe.vertices[v].time] += 1;
        }

        let n_triangles = reader.next_count("triangle count")?;
        let mut triangle_order = Vec::with_capacity(n_triangles);
        for _ in 0..n_triangles {
            triangle_order.push(universe.triangles.create()?);
        }
        for i in 0..n_triangles {
            let t = triangle_order[i];
            let vl = reader.next_index("vertex index", n_vertices)?;
            let vr = reader.next_index("vertex index", n_vertices)?;
            let vc = reader.next_index("vertex index", n_vertices)?;
            universe.set_vertices(t, vertex_order[vl], vertex_order[vr], vertex_order[vc]);

            let tl = reader.next_index("triangle index", n_triangles)?;
            let tr = reader.next_index("triangle index", n_triangles)?;
            let tc = reader.next_index("triangle index", n_triangles)?;
            let tri = &mut universe.triangles[t];
            tri.tl = triangle_order[tl];
            tri.tr = triangle_order[tr];
            tri.tc = triangle_order[tc];

            universe.triangles_all.add(t)?;
        }
        let sentinel = reader.next_count("triangle sentinel")?;
        if sentinel != n_triangles {
            return Err(reader.format_error(format!(
                "triangle sentinel {sentinel} does not match count {n_triangles}"
            )));
        }

        // The candidate sets are not persisted; rescan the loaded geometry.
        for &t in &triangle_order {
            let tri = universe.triangles[t];
            if tri.is_up() {
                let v = tri.vl;
                if universe.is_four_vertex(v) && !universe.vertices_four.contains(v) {
                    universe.vertices_four.add(v)?;
                }
            }
            if tri.orientation != universe.triangles[tri.tr].orientation {
                universe.triangles_flip.add(t)?;
            }
        }

        universe.validate()?;
        info!(path = %path.display(), vertices = n_vertices, triangles = n_triangles,
              "imported geometry");
        Ok(universe)
    }
}

struct TokenReader<'a> {
    tokens: SplitWhitespace<'a>,
    path: &'a Path,
}

impl TokenReader<'_> {
    fn format_error(&self, message: String) -> UniverseError {
        UniverseError::GeometryFormat {
            path: self.path.to_path_buf(),
            message,
        }
    }

    fn next_count(&mut self, what: &str) -> Result<usize, UniverseError> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| self.format_error(format!("unexpected end of file reading {what}")))?;
        token
            .parse()
            .map_err(|_| self.format_error(format!("malformed {what}: {token:?}")))
    }

    fn next_index(&mut self, what: &str, bound: usize) -> Result<usize, UniverseError> {
        let index = self.next_count(what)?;
        if index >= bound {
            return Err(self.format_error(format!("{what} {index} out of range 0..{bound}")));
        }
        Ok(index)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_strip_counts() {
        let universe = Universe::create(4, false).unwrap();
        assert_eq!(universe.vertex_count(), 12);
        assert_eq!(universe.triangle_count(), 24);
        assert_eq!(universe.slice_sizes(), &[3, 3, 3, 3]);
        assert_eq!(universe.triangles_all().len(), 24);
        assert_eq!(universe.triangles_flip().len(), 24);
        assert_eq!(universe.vertices_four().len(), 0);
        universe.validate().unwrap();
    }

    #[test]
    fn seed_strip_rejects_two_slices() {
        assert!(matches!(
            Universe::create(2, false),
            Err(UniverseError::TooFewSlices { n_slices: 2 })
        ));
    }

    #[test]
    fn insert_creates_a_four_vertex() {
        let mut universe = Universe::create(4, false).unwrap();
        let t = universe
            .triangles
            .labels()
            .find(|&t| universe.triangle(t).is_up())
            .unwrap();
        let time = universe.triangle(t).time();

        universe.insert_vertex(t).unwrap();
        assert_eq!(universe.vertex_count(), 13);
        assert_eq!(universe.triangle_count(), 26);
        assert_eq!(universe.slice_sizes()[time], 4);
        assert_eq!(universe.vertices_four().len(), 1);
        universe.validate().unwrap();
    }

    #[test]
    fn delete_undoes_insert() {
        let mut universe = Universe::create(4, false).unwrap();
        let t = universe
            .triangles
            .labels()
            .find(|&t| universe.triangle(t).is_up())
            .unwrap();
        let time = universe.triangle(t).time();

        let v = universe.insert_vertex(t).unwrap();
        universe.remove_vertex(v).unwrap();

        assert_eq!(universe.vertex_count(), 12);
        assert_eq!(universe.triangle_count(), 24);
        assert_eq!(universe.slice_sizes()[time], 3);
        assert_eq!(universe.vertices_four().len(), 0);
        universe.validate().unwrap();
    }

    #[test]
    fn flip_twice_is_the_identity() {
        let mut universe = Universe::create(4, false).unwrap();
        let t = universe.triangles_flip().iter().next().unwrap();

        let triangles_before: Vec<Triangle> = universe
            .triangles
            .labels()
            .map(|t| universe.triangles[t])
            .collect();
        let vertices_before: Vec<Vertex> = universe
            .vertices
            .labels()
            .map(|v| universe.vertices[v])
            .collect();

        universe.flip_link(t).unwrap();
        universe.validate().unwrap();
        universe.flip_link(t).unwrap();
        universe.validate().unwrap();

        let triangles_after: Vec<Triangle> = universe
            .triangles
            .labels()
            .map(|t| universe.triangles[t])
            .collect();
        let vertices_after: Vec<Vertex> = universe
            .vertices
            .labels()
            .map(|v| universe.vertices[v])
            .collect();
        assert_eq!(triangles_before, triangles_after);
        assert_eq!(vertices_before, vertices_after);
    }

    #[test]
    fn prepare_rebuilds_three_links_per_vertex() {
        let mut universe = Universe::create(4, false).unwrap();
        universe.prepare().unwrap();
        assert_eq!(universe.link_count(), 3 * universe.vertex_count());
        assert_eq!(universe.vertex_labels().len(), universe.vertex_count());
        assert_eq!(universe.triangle_labels().len(), universe.triangle_count());

        // In the seed strip every vertex has coordination 6.
        for &v in universe.vertex_labels() {
            assert_eq!(universe.vertex_neighbors_of(v).len(), 6);
        }
        for &t in universe.triangle_labels() {
            assert_eq!(universe.triangle_neighbors_of(t).len(), 3);
            assert_eq!(universe.links_of_triangle(t).len(), 3);
        }

        // A second rebuild replaces, not accumulates.
        universe.prepare().unwrap();
        assert_eq!(universe.link_count(), 3 * universe.vertex_count());
    }

    #[test]
    fn timelike_and_spacelike_links() {
        let mut universe = Universe::create(4, false).unwrap();
        universe.prepare().unwrap();
        let timelike = universe
            .link_labels()
            .iter()
            .filter(|&&l| universe.link_is_timelike(l))
            .count();
        let total = universe.link_labels().len();
        // Two timelike links and one spacelike link per vertex.
        assert_eq!(timelike, 2 * universe.vertex_count());
        assert_eq!(total - timelike, universe.vertex_count());
    }

    #[test]
    fn export_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geometry.dat");

        let mut universe = Universe::create(5, false).unwrap();
        let t = universe
            .triangles
            .labels()
            .find(|&t| universe.triangle(t).is_up())
            .unwrap();
        universe.insert_vertex(t).unwrap();
        universe.export_geometry(&path).unwrap();

        let imported = Universe::import_geometry(&path, false).unwrap();
        assert_eq!(imported.n_slices(), universe.n_slices());
        assert_eq!(imported.slice_sizes(), universe.slice_sizes());
        assert_eq!(imported.vertex_count(), universe.vertex_count());
        assert_eq!(imported.triangle_count(), universe.triangle_count());
        assert_eq!(
            imported.vertices_four().len(),
            universe.vertices_four().len()
        );
        assert_eq!(
            imported.triangles_flip().len(),
            universe.triangles_flip().len()
        );
        imported.validate().unwrap();
    }

    #[test]
    fn import_rejects_bad_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geometry.dat");

        let universe = Universe::create(4, false).unwrap();
        universe.export_geometry(&path).unwrap();

        let mut text = fs::read_to_string(&path).unwrap();
        // Corrupt the trailing triangle sentinel.
        text = text.trim_end().rsplit_once('\n').unwrap().0.to_string() + "\n999\n";
        fs::write(&path, text).unwrap();

        assert!(matches!(
            Universe::import_geometry(&path, false),
            Err(UniverseError::GeometryFormat { .. })
        ));
    }
}
