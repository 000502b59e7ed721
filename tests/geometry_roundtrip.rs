//! Checkpoint format: export/import roundtrips and sentinel verification.

use cdt::core::universe::{Universe, UniverseError, geometry_filename};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;

/// An evolved torus with a spread of slice sizes and candidate-set content.
fn evolved_universe() -> Universe {
    let mut universe = Universe::create(6, false).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    for _ in 0..60 {
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
    }
    universe.validate().unwrap();
    universe
}

#[test]
fn roundtrip_preserves_the_geometry_up_to_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geometry.dat");

    let universe = evolved_universe();
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
fn reexport_of_an_import_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.dat");
    let second = dir.path().join("second.dat");

    let universe = evolved_universe();
    universe.export_geometry(&first).unwrap();
    let imported = Universe::import_geometry(&first, false).unwrap();
    imported.export_geometry(&second).unwrap();

    // Import numbers records in file order, so a second export reproduces
    // the file exactly.
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn both_sentinels_are_verified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geometry.dat");
    let universe = Universe::create(4, false).unwrap();
    universe.export_geometry(&path).unwrap();
    let pristine = fs::read_to_string(&path).unwrap();

    // Corrupt the vertex-count sentinel (line nV + 2).
    let mut lines: Vec<&str> = pristine.lines().collect();
    let n_vertices: usize = lines[0].parse().unwrap();
    let bad = "999";
    lines[n_vertices + 1] = bad;
    fs::write(&path, lines.join("\n")).unwrap();
    assert!(matches!(
        Universe::import_geometry(&path, false),
        Err(UniverseError::GeometryFormat { .. })
    ));

    // Corrupt the trailing triangle-count sentinel.
    let mut lines: Vec<&str> = pristine.lines().collect();
    let last = lines.len() - 1;
    lines[last] = bad;
    fs::write(&path, lines.join("\n")).unwrap();
    assert!(matches!(
        Universe::import_geometry(&path, false),
        Err(UniverseError::GeometryFormat { .. })
    ));
}

#[test]
fn truncated_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geometry.dat");
    let universe = Universe::create(4, false).unwrap();
    universe.export_geometry(&path).unwrap();

    let pristine = fs::read_to_string(&path).unwrap();
    let half: String = pristine
        .lines()
        .take(pristine.lines().count() / 2)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, half).unwrap();

    assert!(matches!(
        Universe::import_geometry(&path, false),
        Err(UniverseError::GeometryFormat { .. })
    ));
}

#[test]
fn out_of_range_indices_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geometry.dat");
    let universe = Universe::create(4, false).unwrap();
    universe.export_geometry(&path).unwrap();

    let pristine = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = pristine.lines().map(str::to_string).collect();
    let n_vertices: usize = lines[0].parse().unwrap();
    // First vertex index of the first triangle.
    lines[n_vertices + 3] = format!("{n_vertices}");
    fs::write(&path, lines.join("\n")).unwrap();

    assert!(matches!(
        Universe::import_geometry(&path, false),
        Err(UniverseError::GeometryFormat { .. })
    ));
}

#[test]
fn checkpoint_filenames_follow_the_convention() {
    assert_eq!(
        geometry_filename(16000, 100, 1, false),
        std::path::PathBuf::from("geom/geometry-v16000-t100-s1.dat")
    );
    assert_eq!(
        geometry_filename(8000, 50, 7, true),
        std::path::PathBuf::from("geom/geometry-v8000-t50-s7-sphere.dat")
    );
}
