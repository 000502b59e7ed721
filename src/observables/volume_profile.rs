//! The volume profile: vertex count per time slice.

#![forbid(unsafe_code)]

use super::frame::{Observable, join_tokens};

/// One line per measurement: `n_slices` integers, the size of each slice.
#[must_use]
pub fn volume_profile(file_id: &str) -> Observable {
    Observable::new("volume_profile", file_id, |universe, _rng| {
        Ok(join_tokens(universe.slice_sizes().iter().copied()))
    })
}
