//! Caller-owned cache of basis tables, keyed by window length.

use alloc::sync::Arc;
use hashbrown::HashMap;

use crate::dft::Basis;
use crate::num::Float;

/// Reuses [`Basis`] tables across STFT calls with the same `win_length`.
///
/// The kernel itself is stateless; holding a planner only saves rebuilding
/// the `cos`/`sin` table on every call.
pub struct StftPlanner<T: Float> {
    cache: HashMap<usize, Arc<Basis<T>>>,
}

impl<T: Float> Default for StftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> StftPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Basis table for windows of `win_length` samples, built on first use.
    pub fn basis(&mut self, win_length: usize) -> Arc<Basis<T>> {
        let basis = self.cache.entry(win_length).or_insert_with(|| {
            verbose!(debug, "planner: building basis for win_length={}", win_length);
            Arc::new(Basis::new(win_length))
        });
        Arc::clone(basis)
    }

    /// Number of cached tables.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
