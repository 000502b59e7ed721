//! Run configuration: one `key value` pair per line.
//!
//! Blank lines and lines starting with `#` are ignored. Recognized keys:
//! `lambda`, `targetVolume`, `slices`, `seed`, `fileID`, `measurements`,
//! `sphere`, `importGeom`. All keys are required.

#![forbid(unsafe_code)]

use crate::core::collections::FastHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config file {path}: {source}")]
    Io {
        /// The offending file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// A line was not a `key value` pair.
    #[error("config line {line} is not a `key value` pair: {text:?}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A required key was absent.
    #[error("config key {key:?} is missing")]
    MissingKey {
        /// The absent key.
        key: &'static str,
    },
    /// A key's value failed to parse or violated its constraint.
    #[error("config key {key:?} has invalid value {value:?}: {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Its raw value.
        value: String,
        /// What was expected.
        message: String,
    },
}

/// A fully parsed and validated run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Cosmological constant of the action.
    pub lambda: f64,
    /// Triangle count the volume-fixing term drives toward; even, ≥ 4.
    pub target_volume: usize,
    /// Number of time slices; ≥ 2.
    pub slices: usize,
    /// Base seed of both RNG streams.
    pub seed: u64,
    /// Identifier spliced into observable output filenames.
    pub file_id: String,
    /// Number of measurements to take.
    pub measurements: usize,
    /// Spherical boundary slices instead of a torus.
    pub sphere: bool,
    /// Load the checkpointed geometry for these parameters if present.
    pub import_geom: bool,
}

impl Config {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first unreadable, missing or
    /// malformed entry.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_contents(&text)
    }

    fn from_str_contents(text: &str) -> Result<Self, ConfigError> {
        let mut entries: FastHashMap<&str, &str> = FastHashMap::default();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                return Err(ConfigError::MalformedLine {
                    line: i + 1,
                    text: raw.to_string(),
                });
            };
            entries.insert(key.trim(), value.trim());
        }

        let lambda = parse_entry(&entries, "lambda")?;
        let target_volume: usize = parse_entry(&entries, "targetVolume")?;
        if target_volume < 4 || target_volume % 2 != 0 {
            return Err(invalid(
                "targetVolume",
                &entries,
                "an even integer of at least 4",
            ));
        }
        let slices: usize = parse_entry(&entries, "slices")?;
        if slices < 2 {
            return Err(invalid("slices", &entries, "an integer of at least 2"));
        }
        let seed = parse_entry(&entries, "seed")?;
        let file_id = get_entry(&entries, "fileID")?.to_string();
        let measurements = parse_entry(&entries, "measurements")?;
        let sphere = parse_bool(&entries, "sphere")?;
        let import_geom = parse_bool(&entries, "importGeom")?;

        Ok(Self {
            lambda,
            target_volume,
            slices,
            seed,
            file_id,
            measurements,
            sphere,
            import_geom,
        })
    }
}

fn get_entry<'a>(
    entries: &FastHashMap<&str, &'a str>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    entries
        .get(key)
        .copied()
        .ok_or(ConfigError::MissingKey { key })
}

fn parse_entry<T: std::str::FromStr>(
    entries: &FastHashMap<&str, &str>,
    key: &'static str,
) -> Result<T, ConfigError> {
    let value = get_entry(entries, key)?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        message: format!("expected a {}", std::any::type_name::<T>()),
    })
}

fn parse_bool(
    entries: &FastHashMap<&str, &str>,
    key: &'static str,
) -> Result<bool, ConfigError> {
    match get_entry(entries, key)? {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            value: other.to_string(),
            message: "expected \"true\" or \"false\"".to_string(),
        }),
    }
}

fn invalid(
    key: &'static str,
    entries: &FastHashMap<&str, &str>,
    message: &str,
) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: entries.get(key).copied().unwrap_or_default().to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "\
lambda 0.693147
targetVolume 16000
slices 100
seed 1
fileID collab-16000-1
measurements 10
sphere false
importGeom false
";

    #[test]
    fn parses_a_complete_file() {
        let config = Config::from_str_contents(COMPLETE).unwrap();
        assert_eq!(config.target_volume, 16000);
        assert_eq!(config.slices, 100);
        assert_eq!(config.seed, 1);
        assert_eq!(config.file_id, "collab-16000-1");
        assert_eq!(config.measurements, 10);
        assert!(!config.sphere);
        assert!(!config.import_geom);
        assert!((config.lambda - f64::ln(2.0)).abs() < 1e-5);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = format!("# a comment\n\n{COMPLETE}");
        assert!(Config::from_str_contents(&text).is_ok());
    }

    #[test]
    fn missing_key_is_reported() {
        let text = COMPLETE.replace("seed 1\n", "");
        assert!(matches!(
            Config::from_str_contents(&text),
            Err(ConfigError::MissingKey { key: "seed" })
        ));
    }

    #[test]
    fn odd_target_volume_is_rejected() {
        let text = COMPLETE.replace("targetVolume 16000", "targetVolume 15999");
        assert!(matches!(
            Config::from_str_contents(&text),
            Err(ConfigError::InvalidValue {
                key: "targetVolume",
                ..
            })
        ));
    }

    #[test]
    fn malformed_bool_is_rejected() {
        let text = COMPLETE.replace("sphere false", "sphere maybe");
        assert!(matches!(
            Config::from_str_contents(&text),
            Err(ConfigError::InvalidValue { key: "sphere", .. })
        ));
    }

    #[test]
    fn keyless_line_is_rejected() {
        let text = format!("{COMPLETE}orphan\n");
        assert!(matches!(
            Config::from_str_contents(&text),
            Err(ConfigError::MalformedLine { .. })
        ));
    }
}
