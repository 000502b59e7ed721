//! Move-level integrity: each local move preserves every global invariant,
//! and the insert/delete and flip/flip pairs are inverses.

use cdt::core::triangle::{Triangle, TriangleKey};
use cdt::core::universe::Universe;
use cdt::core::vertex::{Vertex, VertexKey};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn snapshot(universe: &Universe) -> (Vec<(VertexKey, Vertex)>, Vec<(TriangleKey, Triangle)>) {
    let mut vertices: Vec<(VertexKey, Vertex)> = universe
        .vertex_labels()
        .iter()
        .map(|&v| (v, *universe.vertex(v)))
        .collect();
    let mut triangles: Vec<(TriangleKey, Triangle)> = universe
        .triangle_labels()
        .iter()
        .map(|&t| (t, *universe.triangle(t)))
        .collect();
    vertices.sort_by_key(|&(v, _)| v);
    triangles.sort_by_key(|&(t, _)| t);
    (vertices, triangles)
}

fn prepared(slices: usize) -> Universe {
    let mut universe = Universe::create(slices, false).unwrap();
    universe.prepare().unwrap();
    universe
}

#[test]
fn insert_then_delete_restores_the_geometry() {
    let mut universe = prepared(4);
    let before = snapshot(&universe);
    let counts_before = (
        universe.vertex_count(),
        universe.triangle_count(),
        universe.slice_sizes().to_vec(),
        universe.triangles_flip().len(),
    );

    let t = universe
        .triangle_labels()
        .iter()
        .copied()
        .find(|&t| universe.triangle(t).is_up())
        .unwrap();
    let time = universe.triangle(t).time();

    let v = universe.insert_vertex(t).unwrap();
    assert_eq!(universe.vertex_count(), counts_before.0 + 1);
    assert_eq!(universe.triangle_count(), counts_before.1 + 2);
    assert_eq!(universe.slice_sizes()[time], counts_before.2[time] + 1);
    assert!(universe.vertices_four().contains(v));
    assert_eq!(universe.vertices_four().len(), 1);
    universe.validate().unwrap();

    universe.remove_vertex(v).unwrap();
    universe.validate().unwrap();

    assert_eq!(
        (
            universe.vertex_count(),
            universe.triangle_count(),
            universe.slice_sizes().to_vec(),
            universe.triangles_flip().len(),
        ),
        counts_before
    );

    // The surviving records are restored field for field.
    universe.prepare().unwrap();
    assert_eq!(snapshot(&universe), before);
}

#[test]
fn insert_works_on_either_orientation() {
    let mut universe = prepared(4);
    let t = universe
        .triangle_labels()
        .iter()
        .copied()
        .find(|&t| universe.triangle(t).is_down())
        .unwrap();
    let base = universe.triangle(t).time();

    universe.insert_vertex(t).unwrap();
    assert_eq!(universe.slice_sizes()[base], 4);
    assert_eq!(universe.vertices_four().len(), 1);
    universe.validate().unwrap();
}

#[test]
fn every_seed_triangle_can_be_flipped() {
    let universe = prepared(4);
    for t in universe.triangles_flip().iter().collect::<Vec<_>>() {
        let mut copy = universe.clone();
        copy.flip_link(t).unwrap();
        copy.validate().unwrap();
    }
}

#[test]
fn random_move_walks_preserve_every_invariant() {
    let mut universe = Universe::create(5, false).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for step in 0..400 {
        match rng.random_range(0..3u32) {
            0 => {
                let t = universe.triangles_all().pick(&mut rng).unwrap();
                universe.insert_vertex(t).unwrap();
            }
            1 => {
                if let Ok(v) = universe.vertices_four().pick(&mut rng) {
                    if universe.slice_sizes()[universe.vertex(v).time()] >= 4 {
                        universe.remove_vertex(v).unwrap();
                    }
                }
            }
            _ => {
                if let Ok(t) = universe.triangles_flip().pick(&mut rng) {
                    universe.flip_link(t).unwrap();
                }
            }
        }
        if step % 50 == 0 {
            universe.validate().unwrap();
        }
    }
    universe.validate().unwrap();

    // The adjacency rebuild still produces three links per vertex.
    universe.prepare().unwrap();
    assert_eq!(universe.link_count(), 3 * universe.vertex_count());
}

#[test]
fn four_vertex_set_tracks_coordination_through_flips() {
    let mut universe = Universe::create(4, false).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(23);

    // Grow a little so flips have room to create and destroy 4-vertices.
    for _ in 0..20 {
        let t = universe.triangles_all().pick(&mut rng).unwrap();
        universe.insert_vertex(t).unwrap();
    }
    universe.validate().unwrap();

    for _ in 0..200 {
        if let Ok(t) = universe.triangles_flip().pick(&mut rng) {
            universe.flip_link(t).unwrap();
        }
    }
    // validate() recounts every coordination number directly.
    universe.validate().unwrap();
}
