//! The measurement frame: named observables writing one line per sweep.
//!
//! An [`Observable`] pairs a name and output path with a process closure
//! that turns the current universe into one line of whitespace-separated
//! numeric tokens. [`clear`](Observable::clear) truncates (and creates) the
//! output file at the start of a run; [`measure`](Observable::measure)
//! invokes the closure and appends its line.

#![forbid(unsafe_code)]

use crate::core::universe::Universe;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The RNG stream observables sample with, distinct from the stream that
/// drives move selection.
pub type SampleRng = rand_chacha::ChaCha8Rng;

/// Errors raised while measuring or writing an observable.
#[derive(Debug, Error)]
pub enum ObservableError {
    /// The output file could not be created, truncated or appended.
    #[error("observable file {path}: {source}")]
    Io {
        /// The output file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The measurement could not be taken on this configuration.
    #[error("measurement failed: {message}")]
    Measurement {
        /// What went wrong.
        message: String,
    },
}

/// A named measurement writing to `out/{name}-{file_id}.dat`.
pub struct Observable {
    name: String,
    path: PathBuf,
    process: Box<dyn FnMut(&Universe, &mut SampleRng) -> Result<String, ObservableError>>,
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Observable {
    /// Wraps a process closure under the standard output-file convention.
    pub fn new<F>(name: &str, file_id: &str, process: F) -> Self
    where
        F: FnMut(&Universe, &mut SampleRng) -> Result<String, ObservableError> + 'static,
    {
        Self {
            name: name.to_string(),
            path: PathBuf::from(format!("out/{name}-{file_id}.dat")),
            process: Box::new(process),
        }
    }

    /// Redirects the output to an explicit path, replacing the `out/`
    /// convention; useful when embedding the sampler.
    #[must_use]
    pub fn redirect(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// The observable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The output file this observable appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncates the output file, creating it (and its directory) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ObservableError::Io`] on filesystem failure.
    pub fn clear(&self) -> Result<(), ObservableError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ObservableError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        fs::File::create(&self.path)
            .map(|_| ())
            .map_err(|source| ObservableError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Runs the process closure on the prepared universe and appends its
    /// line to the output file.
    ///
    /// # Errors
    ///
    /// Propagates failures of the process closure and of the append.
    pub fn measure(
        &mut self,
        universe: &Universe,
        rng: &mut SampleRng,
    ) -> Result<(), ObservableError> {
        let line = (self.process)(universe, rng)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ObservableError::Io {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| ObservableError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(name = %self.name, "recorded measurement");
        Ok(())
    }
}

/// Joins numeric tokens into the one-line output format.
pub(crate) fn join_tokens<I, T>(tokens: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    use std::fmt::Write as _;
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() {
            line.push(' ');
        }
        let _ = write!(line, "{token}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn join_tokens_is_space_separated() {
        assert_eq!(join_tokens([3usize, 3, 4]), "3 3 4");
        assert_eq!(join_tokens(Vec::<usize>::new()), "");
    }

    #[test]
    fn clear_then_measure_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.dat");
        let mut observable = Observable {
            name: "lines".to_string(),
            path: path.clone(),
            process: Box::new(|universe, _| Ok(universe.triangle_count().to_string())),
        };

        let universe = Universe::create(4, false).unwrap();
        let mut rng = SampleRng::seed_from_u64(1);

        observable.clear().unwrap();
        observable.measure(&universe, &mut rng).unwrap();
        observable.measure(&universe, &mut rng).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "24\n24\n");

        // A fresh run truncates what the previous one wrote.
        observable.clear().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
