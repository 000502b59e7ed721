//! Move throughput on a small equilibrated universe.

use cdt::core::universe::Universe;
use cdt::simulation::Simulation;
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn equilibrated() -> Universe {
    let mut universe = Universe::create(8, false).unwrap();
    let mut simulation = Simulation::new(f64::ln(2.0), 256, 1).unwrap();
    simulation.set_checkpointing(false);
    simulation.run(&mut universe, 1, false).unwrap();
    universe
}

fn bench_moves(c: &mut Criterion) {
    let universe = equilibrated();

    c.bench_function("insert_delete_pair", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut universe = universe.clone();
        b.iter(|| {
            let t = universe.triangles_all().pick(&mut rng).unwrap();
            let v = universe.insert_vertex(t).unwrap();
            universe.remove_vertex(v).unwrap();
        });
    });

    c.bench_function("flip", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut universe = universe.clone();
        b.iter(|| {
            if let Ok(t) = universe.triangles_flip().pick(&mut rng) {
                universe.flip_link(t).unwrap();
            }
        });
    });

    c.bench_function("adjacency_rebuild", |b| {
        let mut universe = universe.clone();
        b.iter(|| universe.prepare().unwrap());
    });
}

criterion_group!(benches, bench_moves);
criterion_main!(benches);
