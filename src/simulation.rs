//! The Metropolis driver: move selection, acceptance, sweeps and phases.
//!
//! One attempt picks a move kind (insert-or-delete with probability 1/2,
//! split evenly; flip with probability 1/2), draws a candidate uniformly
//! from the matching set and applies the Metropolis rule to the detailed-
//! balance acceptance ratio of the move. A quadratic volume-fixing term
//! biases insert/delete toward the target volume.
//!
//! A run proceeds in three phases:
//!
//! 1. *Grow*: batches of `targetVolume` attempts until the volume first
//!    reaches the target.
//! 2. *Thermalize*: sweeps of `100 · targetVolume` attempts until no vertex
//!    exceeds the heuristic coordination bound `log₂(2 · targetVolume)` in
//!    either time direction.
//! 3. *Measure*: per measurement, one sweep, then a tail of attempts until
//!    the volume sits exactly on the target, then an adjacency rebuild and
//!    one line from every registered observable. The geometry is
//!    checkpointed after thermalization and every tenth measurement.
//!
//! Two ChaCha streams derived from the base seed keep move selection and
//! observable sampling reproducible and independent of each other.

#![forbid(unsafe_code)]

use crate::core::universe::{Universe, UniverseError, geometry_filename};
use crate::observables::{Observable, ObservableError, SampleRng};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

/// Stream index of the move-selection RNG.
pub const MOVE_STREAM: u64 = 0;
/// Stream index of the observable-sampling RNG.
pub const SAMPLE_STREAM: u64 = 1;

/// Strength of the volume-fixing term `ε · (N − N*)²`.
const EPSILON: f64 = 0.02;
/// Attempts per sweep and per thermalization step, in units of the target
/// volume.
const SWEEP_FACTOR: usize = 100;
/// Attempts per grow step, in units of the target volume. A heuristic knob;
/// larger values only coarsen progress reporting.
const GROW_FACTOR: usize = 1;
/// Slices shrink no further than this many vertices, so a universe of `n`
/// slices cannot hold fewer than `6 n` triangles.
const MIN_SLICE_SIZE: usize = 3;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The target volume is odd or below the minimal closed surface.
    #[error("target volume {target_volume} must be an even number of at least 4")]
    InvalidTargetVolume {
        /// The rejected value.
        target_volume: usize,
    },
    /// The target volume can never be reached because slices cannot shrink
    /// below the manifold minimum.
    #[error(
        "target volume {target_volume} is below the {minimum}-triangle floor of a {n_slices}-slice universe"
    )]
    TargetVolumeUnreachable {
        /// The rejected value.
        target_volume: usize,
        /// The slice count of the universe being driven.
        n_slices: usize,
        /// The smallest volume that universe can reach.
        minimum: usize,
    },
    /// A move left the universe in a failed state; carries the sweep and
    /// attempt counters for the diagnostic line.
    #[error("sweep {sweep}, attempt {attempt}: {source}")]
    MoveFailed {
        /// Sweeps completed when the failure occurred.
        sweep: u64,
        /// Attempts made when the failure occurred.
        attempt: u64,
        /// The underlying failure.
        source: UniverseError,
    },
    /// An observable failed to measure or write.
    #[error("measurement {index}, observable {name}: {source}")]
    ObservableFailed {
        /// Index of the measurement being taken.
        index: usize,
        /// Name of the failing observable.
        name: String,
        /// The underlying failure.
        source: ObservableError,
    },
    /// A failure outside the move loop (checkpointing, adjacency rebuild).
    #[error(transparent)]
    Universe(#[from] UniverseError),
}

/// What a single attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoveOutcome {
    Insert,
    Delete,
    Flip,
    Rejected,
}

/// Per-sweep counts of accepted moves and rejections, surfaced through the
/// debug log after every sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MoveTally {
    insert: u64,
    delete: u64,
    flip: u64,
    rejected: u64,
}

/// A Metropolis run over one universe.
#[derive(Debug)]
pub struct Simulation {
    lambda: f64,
    target_volume: usize,
    seed: u64,
    epsilon: f64,
    move_rng: ChaCha8Rng,
    sample_rng: SampleRng,
    observables: Vec<Observable>,
    checkpointing: bool,
    sweeps: u64,
    attempts: u64,
}

impl Simulation {
    /// Sets up a driver for the given cosmological constant, target volume
    /// and base seed.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidTargetVolume`] unless the target is
    /// even and at least 4.
    pub fn new(lambda: f64, target_volume: usize, seed: u64) -> Result<Self, SimulationError> {
        if target_volume < 4 || target_volume % 2 != 0 {
            return Err(SimulationError::InvalidTargetVolume { target_volume });
        }

        let mut move_rng = ChaCha8Rng::seed_from_u64(seed);
        move_rng.set_stream(MOVE_STREAM);
        let mut sample_rng = SampleRng::seed_from_u64(seed);
        sample_rng.set_stream(SAMPLE_STREAM);

        Ok(Self {
            lambda,
            target_volume,
            seed,
            epsilon: EPSILON,
            move_rng,
            sample_rng,
            observables: Vec::new(),
            checkpointing: true,
            sweeps: 0,
            attempts: 0,
        })
    }

    /// Registers an observable to be measured once per sweep.
    pub fn add_observable(&mut self, observable: Observable) {
        self.observables.push(observable);
    }

    /// Disables geometry checkpoint files; useful for tests and embedding.
    pub fn set_checkpointing(&mut self, enabled: bool) {
        self.checkpointing = enabled;
    }

    /// Runs the full grow → thermalize → measure schedule on `universe`.
    ///
    /// `imported` skips grow and thermalize for a geometry loaded from a
    /// checkpoint. Observable output files are truncated up front; the
    /// geometry is checkpointed after thermalization and every tenth
    /// measurement.
    ///
    /// # Errors
    ///
    /// Aborts on the first move, rebuild, observable or I/O failure, after
    /// the failing operation has reported its context.
    pub fn run(
        &mut self,
        universe: &mut Universe,
        measurements: usize,
        imported: bool,
    ) -> Result<(), SimulationError> {
        let minimum = 2 * MIN_SLICE_SIZE * universe.n_slices();
        if self.target_volume < minimum {
            return Err(SimulationError::TargetVolumeUnreachable {
                target_volume: self.target_volume,
                n_slices: universe.n_slices(),
                minimum,
            });
        }

        for observable in &self.observables {
            observable
                .clear()
                .map_err(|source| SimulationError::ObservableFailed {
                    index: 0,
                    name: observable.name().to_string(),
                    source,
                })?;
        }

        let checkpoint = geometry_filename(
            self.target_volume,
            universe.n_slices(),
            self.seed,
            universe.sphere(),
        );

        if !imported {
            self.grow(universe)?;
            self.thermalize(universe)?;
            if self.checkpointing {
                universe.export_geometry(&checkpoint)?;
            }
        }

        for index in 0..measurements {
            let tally = self.sweep(universe)?;
            debug!(?tally, sweep = self.sweeps, "sweep finished");

            // Volume-fix tail: land exactly on the target before measuring.
            while universe.triangle_count() != self.target_volume {
                self.attempt_move(universe)?;
            }

            universe.prepare()?;
            for observable in &mut self.observables {
                let name = observable.name().to_string();
                observable
                    .measure(universe, &mut self.sample_rng)
                    .map_err(|source| SimulationError::ObservableFailed {
                        index,
                        name,
                        source,
                    })?;
            }
            info!(
                measurement = index,
                volume = universe.triangle_count(),
                "measured"
            );

            if self.checkpointing && index % 10 == 0 {
                universe.export_geometry(&checkpoint)?;
            }
        }

        Ok(())
    }

    /// Sweeps completed so far.
    #[must_use]
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Move attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    fn grow(&mut self, universe: &mut Universe) -> Result<(), SimulationError> {
        let mut steps = 0;
        loop {
            for _ in 0..GROW_FACTOR * self.target_volume {
                self.attempt_move(universe)?;
            }
            steps += 1;
            if universe.triangle_count() >= self.target_volume {
                break;
            }
        }
        info!(steps, volume = universe.triangle_count(), "grown");
        Ok(())
    }

    fn thermalize(&mut self, universe: &mut Universe) -> Result<(), SimulationError> {
        let coordination_bound = (2.0 * self.target_volume as f64).log2();
        let mut steps = 0;
        loop {
            for _ in 0..SWEEP_FACTOR * self.target_volume {
                self.attempt_move(universe)?;
            }
            steps += 1;

            universe.prepare()?;
            let (max_up, max_down) = max_coordinations(universe);
            if (max_up as f64) <= coordination_bound && (max_down as f64) <= coordination_bound
            {
                break;
            }
        }
        info!(steps, "thermalized");
        Ok(())
    }

    fn sweep(&mut self, universe: &mut Universe) -> Result<MoveTally, SimulationError> {
        self.sweeps += 1;
        let mut tally = MoveTally::default();
        for _ in 0..SWEEP_FACTOR * self.target_volume {
            match self.attempt_move(universe)? {
                MoveOutcome::Insert => tally.insert += 1,
                MoveOutcome::Delete => tally.delete += 1,
                MoveOutcome::Flip => tally.flip += 1,
                MoveOutcome::Rejected => tally.rejected += 1,
            }
        }
        Ok(tally)
    }

    fn attempt_move(&mut self, universe: &mut Universe) -> Result<MoveOutcome, SimulationError> {
        self.attempts += 1;
        self.try_move(universe)
            .map_err(|source| SimulationError::MoveFailed {
                sweep: self.sweeps,
                attempt: self.attempts,
                source,
            })
    }

    fn try_move(&mut self, universe: &mut Universe) -> Result<MoveOutcome, UniverseError> {
        if self.move_rng.random_range(0..2u32) == 0 {
            if self.move_rng.random_range(0..2u32) == 0 {
                if self.move_add(universe)? {
                    return Ok(MoveOutcome::Insert);
                }
            } else if self.move_delete(universe)? {
                return Ok(MoveOutcome::Delete);
            }
        } else if self.move_flip(universe)? {
            return Ok(MoveOutcome::Flip);
        }
        Ok(MoveOutcome::Rejected)
    }

    /// Whether the Metropolis rule accepts a proposal with the given ratio.
    fn metropolis(&mut self, acceptance: f64) -> bool {
        acceptance >= 1.0 || self.move_rng.random::<f64>() <= acceptance
    }

    fn move_add(&mut self, universe: &mut Universe) -> Result<bool, UniverseError> {
        let n_vertices = universe.vertex_count() as f64;
        let n_four = universe.vertices_four().len() as f64;
        let mut acceptance = n_vertices / (n_four + 1.0) * (-2.0 * self.lambda).exp();
        let volume_boost = (2.0 * self.epsilon).exp();
        acceptance *= if universe.triangle_count() < self.target_volume {
            volume_boost
        } else {
            1.0 / volume_boost
        };

        let Ok(t) = universe.triangles_all().pick(&mut self.move_rng) else {
            return Ok(false);
        };
        // The pole slices of a spherical universe may not grow. A triangle's
        // time is its base slice for either orientation, and the insert move
        // grows exactly that slice.
        if universe.sphere() {
            let base = universe.triangle(t).time();
            if base == 0 || base == universe.n_slices() - 1 {
                return Ok(false);
            }
        }
        if !self.metropolis(acceptance) {
            return Ok(false);
        }

        universe.insert_vertex(t)?;
        Ok(true)
    }

    fn move_delete(&mut self, universe: &mut Universe) -> Result<bool, UniverseError> {
        if universe.vertices_four().is_empty() {
            return Ok(false);
        }

        let n_vertices = universe.vertex_count() as f64;
        let n_four = universe.vertices_four().len() as f64;
        let mut acceptance = n_four / (n_vertices - 1.0) * (2.0 * self.lambda).exp();
        let volume_boost = (2.0 * self.epsilon).exp();
        acceptance *= if universe.triangle_count() < self.target_volume {
            1.0 / volume_boost
        } else {
            volume_boost
        };

        if !self.metropolis(acceptance) {
            return Ok(false);
        }

        let Ok(v) = universe.vertices_four().pick(&mut self.move_rng) else {
            return Ok(false);
        };
        // Keep every slice above the manifold minimum.
        if universe.slice_sizes()[universe.vertex(v).time()] < MIN_SLICE_SIZE + 1 {
            return Ok(false);
        }

        universe.remove_vertex(v)?;
        Ok(true)
    }

    fn move_flip(&mut self, universe: &mut Universe) -> Result<bool, UniverseError> {
        let Ok(t) = universe.triangles_flip().pick(&mut self.move_rng) else {
            return Ok(false);
        };

        // The flip set size changes by ±1 for the left outer neighbor and
        // ±1 for the right one; the proposal ratio is the size before over
        // the size after.
        let flippable_before = universe.triangles_flip().len() as i64;
        let mut flippable_after = flippable_before;
        let tri = universe.triangle(t);
        let left = universe.triangle(tri.triangle_left());
        if tri.orientation() == left.orientation() {
            flippable_after += 1;
        } else {
            flippable_after -= 1;
        }
        let right = universe.triangle(tri.triangle_right());
        let right_of_right = universe.triangle(right.triangle_right());
        if right.orientation() == right_of_right.orientation() {
            flippable_after += 1;
        } else {
            flippable_after -= 1;
        }

        let acceptance = flippable_before as f64 / flippable_after as f64;
        if !self.metropolis(acceptance) {
            return Ok(false);
        }

        universe.flip_link(t)?;
        Ok(true)
    }
}

/// The largest upward and downward coordination over all vertices, counted
/// on the rebuilt neighbor fans with periodic time.
fn max_coordinations(universe: &Universe) -> (usize, usize) {
    let last = universe.n_slices() - 1;
    let mut max_up = 0;
    let mut max_down = 0;
    for &v in universe.vertex_labels() {
        let time = universe.vertex(v).time();
        let mut up = 0;
        let mut down = 0;
        for &neighbor in universe.vertex_neighbors_of(v) {
            let neighbor_time = universe.vertex(neighbor).time();
            if neighbor_time > time || (time == last && neighbor_time == 0) {
                up += 1;
            }
            if neighbor_time < time || (time == 0 && neighbor_time == last) {
                down += 1;
            }
        }
        max_up = max_up.max(up);
        max_down = max_down.max(down);
    }
    (max_up, max_down)
}
