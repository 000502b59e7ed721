//! Candidate sets with O(1) add, remove, membership and uniform pick.
//!
//! The Monte Carlo moves each draw their input uniformly from a set that
//! must be updated in O(1) as moves mutate the geometry: all triangles for
//! the insert move, coordination-4 vertices for the delete move, flippable
//! triangles for the flip move. A [`Bag`] stores labels in two arrays, a
//! position index (label → slot) and a packed slot → label vector, so that
//! removal swaps the hole with the last slot and picking draws one uniform
//! integer in `[0, len)`.

#![forbid(unsafe_code)]

use rand::Rng;
use slotmap::{Key, SecondaryMap};
use thiserror::Error;

/// Contract violations of the candidate-set operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BagError {
    /// [`Bag::add`] was called with a label already present.
    #[error("label is already in the bag")]
    DuplicateInsert,
    /// [`Bag::remove`] was called with a label not present.
    #[error("label is not in the bag")]
    MissingRemove,
    /// [`Bag::pick`] was called on an empty bag.
    #[error("cannot pick from an empty bag")]
    EmptyPick,
}

/// A set of labels supporting uniform random selection.
#[derive(Clone, Debug, Default)]
pub struct Bag<K: Key> {
    /// label → slot in `slots`; absence marks a label outside the bag.
    index: SecondaryMap<K, usize>,
    /// Packed array of the member labels.
    slots: Vec<K>,
}

impl<K: Key> Bag<K> {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: SecondaryMap::new(),
            slots: Vec::new(),
        }
    }

    /// The number of labels in the bag.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `label` is in the bag.
    #[must_use]
    pub fn contains(&self, label: K) -> bool {
        self.index.contains_key(label)
    }

    /// Adds `label` to the bag.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::DuplicateInsert`] if the label is already present.
    pub fn add(&mut self, label: K) -> Result<(), BagError> {
        if self.contains(label) {
            return Err(BagError::DuplicateInsert);
        }
        self.index.insert(label, self.slots.len());
        self.slots.push(label);
        Ok(())
    }

    /// Removes `label` from the bag, filling its slot with the last member.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::MissingRemove`] if the label is not present.
    pub fn remove(&mut self, label: K) -> Result<(), BagError> {
        let slot = self.index.remove(label).ok_or(BagError::MissingRemove)?;
        let Some(last) = self.slots.pop() else {
            return Err(BagError::MissingRemove);
        };
        if last != label {
            self.slots[slot] = last;
            self.index.insert(last, slot);
        }
        Ok(())
    }

    /// Picks a member uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::EmptyPick`] if the bag is empty.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<K, BagError> {
        if self.slots.is_empty() {
            return Err(BagError::EmptyPick);
        }
        Ok(self.slots[rng.random_range(0..self.slots.len())])
    }

    /// Iterates over the member labels in packed order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().copied()
    }
}
