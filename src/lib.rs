//! # dstft - batched STFT by direct summation
//!
//! Computes the Short-Time Fourier Transform of a batch of real signals by
//! evaluating the windowed DFT sum for every `(batch, frequency bin, frame)`
//! cell. There is deliberately no FFT: each cell costs `O(win_length)`.
//!
//! The output is a real tensor shaped `[batch, num_freq_bins, num_frames, 2]`
//! whose last axis holds `(real, imag)`, with the analysis sign convention
//! (negative sine term).
//!
//! ## Execution strategies
//!
//! - [`stft::sequential`]: one thread, batch → freq → frame loops.
//! - [`stft::simt`]: one lane per batch element, lanes grouped into blocks of
//!   at most [`DeviceCapability::max_lanes_per_block`], run by any
//!   [`launch::LaneExecutor`].
//! - [`stft::parallel`]: the SIMT strategy on rayon (`parallel` feature).
//!
//! Both strategies produce identical output for identical input.
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` impls and environment overrides
//! - `parallel`: rayon-backed lane executor
//! - `verbose-logging`: debug events through the `log` crate
//! - `internal-tests`: property tests with `proptest`
//!
//! ## Example
//!
//! ```
//! use dstft::{SignalBatch, SpectrogramShape, StftConfig, StftOperator, Target};
//!
//! let data = [1.0f32, 2.0, 3.0, 4.0];
//! let signal = SignalBatch::new(&data, 1, 4).unwrap();
//! let mut op = StftOperator::with_dims(StftConfig::new(2, 2, 2), [1, 2, 2, 2]).unwrap();
//! let out = op.generate(&Target::Host, &signal, &[1.0, 1.0]).unwrap();
//! assert_eq!(out.get(0, 0, 0).re, 3.0);
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 (https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license (https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "verbose-logging")]
macro_rules! verbose {
    ($level:ident, $($arg:tt)+) => {
        log::$level!($($arg)+)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! verbose {
    ($level:ident, $($arg:tt)+) => {{
        let _ = format_args!($($arg)+);
    }};
}

/// Scalar parameters and device capability.
pub mod config;

/// Windowed DFT reduction for a single output cell.
pub mod dft;

pub mod error;

/// Block/lane launch geometry and lane executors.
pub mod launch;

pub mod num;

/// Basis-table cache.
pub mod planner;

/// Sequential and SIMT STFT strategies and the operator entry point.
pub mod stft;

/// Signal and spectrogram tensors.
pub mod tensor;

pub use config::{DeviceCapability, StftConfig};
pub use error::{ShapeAxis, StftError};
pub use num::{Complex, Complex32, Complex64, Float};
pub use planner::StftPlanner;
pub use stft::{StftOperator, Target};
pub use tensor::{SignalBatch, Spectrogram, SpectrogramShape};
