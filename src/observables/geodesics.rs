//! Breadth-first geodesic primitives on the primal and dual lattices.
//!
//! All four functions run level-synchronous BFS over the adjacency views
//! rebuilt by [`Universe::prepare`](crate::core::universe::Universe::prepare):
//! vertex neighbors for the primal lattice, triangle neighbors for the dual.
//! Visited marking is a dense per-label secondary map, so each call is
//! linear in the region explored.

#![forbid(unsafe_code)]

use crate::core::triangle::TriangleKey;
use crate::core::universe::Universe;
use crate::core::vertex::VertexKey;
use slotmap::{Key, SecondaryMap};

/// The vertices at primal geodesic distance exactly `radius` from `origin`.
///
/// Returns an empty list for `radius == 0`; callers wanting the origin
/// itself already hold it.
#[must_use]
pub fn sphere(universe: &Universe, origin: VertexKey, radius: usize) -> Vec<VertexKey> {
    bfs_shell(origin, radius, |v| universe.vertex_neighbors_of(v))
}

/// The triangles at dual geodesic distance exactly `radius` from `origin`.
#[must_use]
pub fn sphere_dual(universe: &Universe, origin: TriangleKey, radius: usize) -> Vec<TriangleKey> {
    bfs_shell(origin, radius, |t| universe.triangle_neighbors_of(t))
}

/// The primal hop distance between two vertices, or `None` if they are not
/// connected.
#[must_use]
pub fn distance(universe: &Universe, from: VertexKey, to: VertexKey) -> Option<usize> {
    bfs_distance(from, to, |v| universe.vertex_neighbors_of(v))
}

/// The dual hop distance between two triangles, or `None` if they are not
/// connected.
#[must_use]
pub fn distance_dual(
    universe: &Universe,
    from: TriangleKey,
    to: TriangleKey,
) -> Option<usize> {
    bfs_distance(from, to, |t| universe.triangle_neighbors_of(t))
}

fn bfs_shell<'a, K, N>(origin: K, radius: usize, neighbors: N) -> Vec<K>
where
    K: Key + 'a,
    N: Fn(K) -> &'a [K],
{
    if radius == 0 {
        return Vec::new();
    }

    let mut visited: SecondaryMap<K, ()> = SecondaryMap::new();
    visited.insert(origin, ());
    let mut frontier = vec![origin];
    let mut next = Vec::new();

    for _ in 0..radius {
        for &node in &frontier {
            for &neighbor in neighbors(node) {
                if visited.insert(neighbor, ()).is_none() {
                    next.push(neighbor);
                }
            }
        }
        std::mem::swap(&mut frontier, &mut next);
        next.clear();
        if frontier.is_empty() {
            break;
        }
    }

    frontier
}

fn bfs_distance<'a, K, N>(from: K, to: K, neighbors: N) -> Option<usize>
where
    K: Key + 'a,
    N: Fn(K) -> &'a [K],
{
    if from == to {
        return Some(0);
    }

    let mut visited: SecondaryMap<K, ()> = SecondaryMap::new();
    visited.insert(from, ());
    let mut frontier = vec![from];
    let mut next = Vec::new();
    let mut depth = 0;

    while !frontier.is_empty() {
        depth += 1;
        for &node in &frontier {
            for &neighbor in neighbors(node) {
                if visited.insert(neighbor, ()).is_none() {
                    // Return as soon as the target is marked, not dequeued.
                    if neighbor == to {
                        return Some(depth);
                    }
                    next.push(neighbor);
                }
            }
        }
        std::mem::swap(&mut frontier, &mut next);
        next.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared_universe(slices: usize) -> Universe {
        let mut universe = Universe::create(slices, false).unwrap();
        universe.prepare().unwrap();
        universe
    }

    #[test]
    fn distance_to_self_is_zero() {
        let universe = prepared_universe(4);
        let v = universe.vertex_labels()[0];
        assert_eq!(distance(&universe, v, v), Some(0));
    }

    #[test]
    fn distance_is_symmetric() {
        let universe = prepared_universe(5);
        let labels = universe.vertex_labels();
        for &a in labels {
            for &b in labels {
                assert_eq!(distance(&universe, a, b), distance(&universe, b, a));
            }
        }
    }

    #[test]
    fn distance_satisfies_the_triangle_inequality() {
        let universe = prepared_universe(4);
        let labels = universe.vertex_labels();
        for &a in labels {
            for &b in labels {
                for &c in labels {
                    let ab = distance(&universe, a, b).unwrap();
                    let bc = distance(&universe, b, c).unwrap();
                    let ac = distance(&universe, a, c).unwrap();
                    assert!(ac <= ab + bc, "{ac} > {ab} + {bc}");
                }
            }
        }
    }

    #[test]
    fn unit_sphere_is_the_neighbor_fan() {
        let universe = prepared_universe(4);
        let v = universe.vertex_labels()[0];
        let mut shell = sphere(&universe, v, 1);
        shell.sort_unstable();
        let mut fan: Vec<VertexKey> = universe.vertex_neighbors_of(v).to_vec();
        fan.sort_unstable();
        fan.dedup();
        assert_eq!(shell, fan);
    }

    #[test]
    fn zero_radius_sphere_is_empty() {
        let universe = prepared_universe(4);
        let v = universe.vertex_labels()[0];
        assert!(sphere(&universe, v, 0).is_empty());
        let t = universe.triangle_labels()[0];
        assert!(sphere_dual(&universe, t, 0).is_empty());
    }

    #[test]
    fn dual_distance_crosses_the_strip() {
        let universe = prepared_universe(4);
        let t = universe.triangle_labels()[0];
        // Adjacent triangles sit at dual distance 1.
        for &neighbor in universe.triangle_neighbors_of(t) {
            assert_eq!(distance_dual(&universe, t, neighbor), Some(1));
        }
    }

    #[test]
    fn everything_is_reachable_on_the_torus() {
        let universe = prepared_universe(4);
        let from = universe.vertex_labels()[0];
        for &to in universe.vertex_labels() {
            assert!(distance(&universe, from, to).is_some());
        }
        let from = universe.triangle_labels()[0];
        for &to in universe.triangle_labels() {
            assert!(distance_dual(&universe, from, to).is_some());
        }
    }
}
