use serde::{Deserialize, Serialize};

use super::grain::Grain;

/// Append-only, index-addressed storage for grains.
///
/// Grains are appended at setup time and never removed during a run; a
/// disabled grain stays allocated but inert, so plain `usize` indices are
/// stable for the simulation's lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrainStore {
    grains: Vec<Grain>,
}

impl GrainStore {
    pub fn new() -> Self {
        Self { grains: Vec::new() }
    }

    /// Appends a grain and returns its index.
    pub fn push(&mut self, grain: Grain) -> usize {
        self.grains.push(grain);
        self.grains.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Grain> {
        self.grains.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Grain> {
        self.grains.get_mut(index)
    }

    /// Simultaneous mutable access to two distinct grains.
    ///
    /// Contact resolution applies equal-and-opposite forces to both ends of
    /// a pair in one pass; the split borrow makes that possible without
    /// cloning. Panics if `i == j` or either index is out of bounds, both
    /// of which are programming errors in the caller.
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Grain, &mut Grain) {
        assert_ne!(i, j, "pair_mut requires distinct grain indices");
        if i < j {
            let (left, right) = self.grains.split_at_mut(j);
            (&mut left[i], &mut right[0])
        } else {
            let (left, right) = self.grains.split_at_mut(i);
            (&mut right[0], &mut left[j])
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Grain> {
        self.grains.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Grain> {
        self.grains.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.grains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grains.is_empty()
    }
}
