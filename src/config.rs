//! Scalar STFT parameters and the device capability used to size launches.

use crate::error::StftError;

/// Default lane limit per block, matching common GPU thread-block limits.
pub const DEFAULT_MAX_LANES_PER_BLOCK: usize = 1024;

/// Environment variable overriding [`DeviceCapability::max_lanes_per_block`].
#[cfg(feature = "std")]
pub const MAX_LANES_ENV: &str = "DSTFT_MAX_LANES_PER_BLOCK";

/// Environment variable overriding [`DeviceCapability::threads`].
#[cfg(feature = "std")]
pub const THREADS_ENV: &str = "DSTFT_THREADS";

/// Scalar STFT parameters.
///
/// `n_fft` is carried for callers that track it but does not enter the
/// computation; the number of frequency bins comes from the output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub win_length: usize,
}

impl StftConfig {
    pub fn new(n_fft: usize, hop_length: usize, win_length: usize) -> Self {
        Self {
            n_fft,
            hop_length,
            win_length,
        }
    }

    /// Bin count of a conventional one-sided real DFT, `n_fft / 2 + 1`.
    ///
    /// Informational only; nothing enforces it against the output shape.
    pub fn onesided_freq_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Samples a signal needs so that `num_frames` frames stay in bounds:
    /// `(num_frames - 1) * hop_length + win_length`.
    ///
    /// Zero frames need zero samples.
    pub fn required_samples(&self, num_frames: usize) -> Result<usize, StftError> {
        if num_frames == 0 {
            return Ok(0);
        }
        (num_frames - 1)
            .checked_mul(self.hop_length)
            .and_then(|last_start| last_start.checked_add(self.win_length))
            .ok_or(StftError::Overflow)
    }
}

/// Capabilities of the execution target, passed explicitly to the parallel
/// strategy instead of being looked up from a global context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapability {
    /// Upper bound on lanes grouped into one block.
    pub max_lanes_per_block: usize,
    /// Worker threads for thread-pool backends. `0` uses the shared pool.
    pub threads: usize,
}

impl Default for DeviceCapability {
    fn default() -> Self {
        Self {
            max_lanes_per_block: DEFAULT_MAX_LANES_PER_BLOCK,
            threads: 0,
        }
    }
}

impl DeviceCapability {
    pub fn new(max_lanes_per_block: usize) -> Result<Self, StftError> {
        if max_lanes_per_block == 0 {
            return Err(StftError::InvalidCapability);
        }
        Ok(Self {
            max_lanes_per_block,
            threads: 0,
        })
    }

    /// Use a dedicated pool of `threads` workers (`0` reverts to the shared pool).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Read overrides from `DSTFT_MAX_LANES_PER_BLOCK` and `DSTFT_THREADS`.
    ///
    /// Unset variables fall back to [`DEFAULT_MAX_LANES_PER_BLOCK`] and one
    /// thread per logical CPU. Unparsable values are rejected.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self, StftError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(feature = "std")]
    fn from_lookup<F>(lookup: F) -> Result<Self, StftError>
    where
        F: Fn(&str) -> Option<std::string::String>,
    {
        let parse = |key: &str| -> Result<Option<usize>, StftError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|_| StftError::InvalidValue),
                None => Ok(None),
            }
        };
        let lanes = parse(MAX_LANES_ENV)?.unwrap_or(DEFAULT_MAX_LANES_PER_BLOCK);
        let threads = parse(THREADS_ENV)?.unwrap_or_else(|| num_cpus::get().max(1));
        Ok(Self::new(lanes)?.with_threads(threads))
    }
}
