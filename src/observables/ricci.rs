//! Ricci-like curvature probes: average distance between geodesic spheres.
//!
//! For each configured epsilon the probe takes the epsilon-sphere around a
//! random origin, picks a random point of that sphere, takes the
//! epsilon-sphere around it, and averages the pairwise BFS distance from the
//! first sphere to the second, normalized by epsilon. On a flat lattice the
//! average sits near 1; curvature pushes it off in either direction.

#![forbid(unsafe_code)]

use super::frame::{Observable, SampleRng, join_tokens};
use super::geodesics;
use crate::core::collections::FastHashSet;
use rand::Rng;
use slotmap::{Key, SecondaryMap};

/// Average primal sphere distance for each epsilon, random vertex origins.
#[must_use]
pub fn ricci(file_id: &str, epsilons: Vec<usize>) -> Observable {
    Observable::new("ricci", file_id, move |universe, rng| {
        let mut averages = Vec::with_capacity(epsilons.len());
        for &epsilon in &epsilons {
            let vertices = universe.vertex_labels();
            let origin = vertices[rng.random_range(0..vertices.len())];
            let shell = geodesics::sphere(universe, origin, epsilon);
            averages.push(average_sphere_distance(
                &shell,
                epsilon,
                |v| universe.vertex_neighbors_of(v),
                rng,
            ));
        }
        Ok(join_tokens(averages))
    })
}

/// Average dual sphere distance for each epsilon, random triangle origins.
#[must_use]
pub fn ricci_dual(file_id: &str, epsilons: Vec<usize>) -> Observable {
    Observable::new("ricci_dual", file_id, move |universe, rng| {
        let mut averages = Vec::with_capacity(epsilons.len());
        for &epsilon in &epsilons {
            let triangles = universe.triangle_labels();
            let origin = triangles[rng.random_range(0..triangles.len())];
            let shell = geodesics::sphere_dual(universe, origin, epsilon);
            averages.push(average_sphere_distance(
                &shell,
                epsilon,
                |t| universe.triangle_neighbors_of(t),
                rng,
            ));
        }
        Ok(join_tokens(averages))
    })
}

/// Average BFS distance from the members of `shell` to the epsilon-sphere
/// around one random member, normalized by epsilon. Degenerate shells
/// (possible only on very small configurations) average to 0.
fn average_sphere_distance<'a, K, N>(
    shell: &[K],
    epsilon: usize,
    neighbors: N,
    rng: &mut SampleRng,
) -> f64
where
    K: Key + 'a,
    N: Fn(K) -> &'a [K],
{
    if shell.is_empty() || epsilon == 0 {
        return 0.0;
    }
    let counterpart = shell[rng.random_range(0..shell.len())];
    let counterpart_shell = bfs_shell(counterpart, epsilon, &neighbors);
    if counterpart_shell.is_empty() {
        return 0.0;
    }

    let mut distances: Vec<usize> = Vec::new();
    let mut targets: FastHashSet<K> = FastHashSet::default();
    for &start in shell {
        targets.clear();
        targets.extend(counterpart_shell.iter().copied());

        if targets.remove(&start) {
            distances.push(0);
        }

        let mut visited: SecondaryMap<K, ()> = SecondaryMap::new();
        visited.insert(start, ());
        let mut frontier = vec![start];
        let mut next = Vec::new();

        // The search is bounded at 3 * epsilon hops; targets beyond that
        // contribute nothing.
        'search: for depth in 1..=3 * epsilon {
            for &node in &frontier {
                for &neighbor in neighbors(node) {
                    if visited.insert(neighbor, ()).is_none() {
                        next.push(neighbor);
                        if targets.remove(&neighbor) {
                            distances.push(depth);
                            if targets.is_empty() {
                                break 'search;
                            }
                        }
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
            if frontier.is_empty() {
                break;
            }
        }
    }

    if distances.is_empty() {
        return 0.0;
    }
    let total: usize = distances.iter().sum();
    total as f64 / (epsilon * distances.len()) as f64
}

fn bfs_shell<'a, K, N>(origin: K, radius: usize, neighbors: &N) -> Vec<K>
where
    K: Key + 'a,
    N: Fn(K) -> &'a [K],
{
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
