//! SIMT-style launch geometry and the executors that run it.
//!
//! The batch axis is split into blocks of `lanes_per_block` lanes. Lane
//! `lane` of block `block` has global index `block * lanes_per_block + lane`
//! and owns that batch element; indices past the batch size idle.

use crate::config::DeviceCapability;
use crate::error::StftError;

/// Block/lane decomposition of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchShape {
    pub batch: usize,
    pub lanes_per_block: usize,
    pub block_count: usize,
}

impl LaunchShape {
    /// `lanes_per_block = min(max_lanes_per_block, batch)` and
    /// `block_count = ceil(batch / lanes_per_block)`. An empty batch launches
    /// no blocks.
    pub fn for_batch(batch: usize, capability: &DeviceCapability) -> Result<Self, StftError> {
        if capability.max_lanes_per_block == 0 {
            return Err(StftError::InvalidCapability);
        }
        let lanes_per_block = capability.max_lanes_per_block.min(batch);
        let block_count = if lanes_per_block == 0 {
            0
        } else {
            batch.div_ceil(lanes_per_block)
        };
        Ok(Self {
            batch,
            lanes_per_block,
            block_count,
        })
    }

    /// Lanes launched, including idle tail lanes.
    pub fn total_lanes(&self) -> usize {
        self.block_count * self.lanes_per_block
    }

    pub fn grid_dim(&self) -> (usize, usize, usize) {
        (self.block_count, 1, 1)
    }

    pub fn block_dim(&self) -> (usize, usize, usize) {
        (self.lanes_per_block, 1, 1)
    }

    /// Batch element owned by `(block, lane)`, or `None` for an idle lane.
    #[inline]
    pub fn assigned_batch(&self, block: usize, lane: usize) -> Option<usize> {
        if block >= self.block_count || lane >= self.lanes_per_block {
            return None;
        }
        let global = block * self.lanes_per_block + lane;
        (global < self.batch).then_some(global)
    }
}

/// Parallel-for over the lanes of a [`LaunchShape`].
///
/// `output` is split into `shape.batch` consecutive slabs of `slab_len`
/// elements; every active lane receives its batch index and exclusive access
/// to the matching slab. `launch` returns once every lane has finished.
pub trait LaneExecutor {
    fn launch<T, F>(&self, shape: &LaunchShape, output: &mut [T], slab_len: usize, body: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send;
}

/// Runs a launch on the calling thread, block by block and lane by lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialLanes;

impl LaneExecutor for SerialLanes {
    fn launch<T, F>(&self, shape: &LaunchShape, output: &mut [T], slab_len: usize, body: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        debug_assert_eq!(output.len(), shape.batch * slab_len);
        for block in 0..shape.block_count {
            for lane in 0..shape.lanes_per_block {
                let Some(batch) = shape.assigned_batch(block, lane) else {
                    continue;
                };
                let start = batch * slab_len;
                body(batch, &mut output[start..start + slab_len]);
            }
        }
    }
}

#[cfg(feature = "parallel")]
pub use self::rayon_lanes::RayonLanes;

#[cfg(feature = "parallel")]
mod rayon_lanes {
    use super::{LaneExecutor, LaunchShape};
    use crate::config::DeviceCapability;
    use crate::error::StftError;
    use rayon::prelude::*;

    /// Runs blocks, and the lanes inside each block, as rayon tasks.
    ///
    /// Uses rayon's global pool unless built with an explicit thread count.
    #[derive(Debug, Default)]
    pub struct RayonLanes {
        pool: Option<rayon::ThreadPool>,
    }

    impl RayonLanes {
        pub fn new() -> Self {
            Self::default()
        }

        /// Dedicated pool of `threads` workers; `0` keeps the global pool.
        pub fn with_threads(threads: usize) -> Result<Self, StftError> {
            if threads == 0 {
                return Ok(Self::new());
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|_| StftError::InvalidValue)?;
            Ok(Self { pool: Some(pool) })
        }

        pub fn for_capability(capability: &DeviceCapability) -> Result<Self, StftError> {
            Self::with_threads(capability.threads)
        }

        /// Worker threads that will run a launch.
        pub fn threads(&self) -> usize {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
    }

    impl LaneExecutor for RayonLanes {
        fn launch<T, F>(&self, shape: &LaunchShape, output: &mut [T], slab_len: usize, body: F)
        where
            T: Send,
            F: Fn(usize, &mut [T]) + Sync + Send,
        {
            debug_assert_eq!(output.len(), shape.batch * slab_len);
            // chunks of zero length are not allowed
            if slab_len == 0 || shape.block_count == 0 {
                return;
            }
            let block_len = shape.lanes_per_block * slab_len;
            let body = &body;
            let mut run = move || {
                output
                    .par_chunks_mut(block_len)
                    .enumerate()
                    .for_each(|(block, block_out)| {
                        block_out
                            .par_chunks_mut(slab_len)
                            .enumerate()
                            .for_each(|(lane, slab)| {
                                if let Some(batch) = shape.assigned_batch(block, lane) {
                                    body(batch, slab);
                                }
                            });
                    });
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }
}
