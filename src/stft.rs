//! Batched STFT by direct windowed-DFT summation.
//!
//! Two strategies fill the same `[batch, num_freq_bins, num_frames, 2]`
//! output:
//!
//! - [`sequential`] walks batch → freq → frame on the calling thread.
//! - [`simt`] launches one lane per batch element on a [`LaneExecutor`]; each
//!   lane walks its own freq → frame loop. [`parallel`] runs it on rayon.
//!
//! Both call the same per-cell reduction, so for identical inputs they
//! produce identical outputs. Every entry point validates shapes and frame
//! bounds first and leaves the output untouched on error.
//!
//! # Example
//! ```
//! use dstft::stft::sequential;
//! use dstft::{SignalBatch, Spectrogram, SpectrogramShape, StftConfig};
//!
//! let data = [1.0f32, 2.0, 3.0, 4.0];
//! let signal = SignalBatch::new(&data, 1, 4).unwrap();
//! let config = StftConfig::new(2, 2, 2);
//! let mut out = Spectrogram::zeros(SpectrogramShape::new(1, 2, 2)).unwrap();
//! sequential(&signal, &[1.0, 1.0], &config, &mut out).unwrap();
//! assert_eq!(out.get(0, 0, 1).re, 7.0);
//! ```

use crate::config::{DeviceCapability, StftConfig};
use crate::dft::Basis;
use crate::error::{ShapeAxis, StftError};
use crate::launch::{LaneExecutor, LaunchShape};
use crate::num::Float;
use crate::planner::StftPlanner;
use crate::tensor::{SignalBatch, Spectrogram, SpectrogramShape};

/// Check every precondition of an STFT call.
///
/// - `window.len() == config.win_length`
/// - `shape.batch == signal.batch()`
/// - `(num_frames - 1) * hop_length + win_length <= signal.samples()`
///
/// The bounds check is skipped when no sample is read: an empty output or a
/// zero-length window.
pub fn validate<T>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    shape: &SpectrogramShape,
) -> Result<(), StftError> {
    let res = check(signal, window, config, shape);
    if let Err(_err) = &res {
        verbose!(debug, "stft: rejected {:?}: {}", shape.dims(), _err);
    }
    res
}

fn check<T>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    shape: &SpectrogramShape,
) -> Result<(), StftError> {
    if window.len() != config.win_length {
        return Err(StftError::shape(
            ShapeAxis::Window,
            config.win_length,
            window.len(),
        ));
    }
    if shape.batch != signal.batch() {
        return Err(StftError::shape(
            ShapeAxis::Batch,
            signal.batch(),
            shape.batch,
        ));
    }
    shape.len()?;
    if shape.is_empty() || config.win_length == 0 {
        return Ok(());
    }
    let required = config.required_samples(shape.num_frames)?;
    if required > signal.samples() {
        return Err(StftError::SignalOutOfBounds {
            required,
            available: signal.samples(),
        });
    }
    Ok(())
}

/// Fill one batch element's `[num_freq_bins, num_frames, 2]` slab.
#[inline]
fn fill_slab<T: Float>(
    row: &[T],
    window: &[T],
    hop_length: usize,
    basis: &Basis<T>,
    shape: &SpectrogramShape,
    slab: &mut [T],
) {
    for freq in 0..shape.num_freq_bins {
        for frame in 0..shape.num_frames {
            let c = basis.project(row, window, frame * hop_length, freq);
            let i = shape.cell_offset(freq, frame);
            slab[i] = c.re;
            slab[i + 1] = c.im;
        }
    }
}

// The `*_with_basis` runners assume their caller already ran `validate`.
fn sequential_with_basis<T: Float>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    basis: &Basis<T>,
    output: &mut Spectrogram<T>,
) -> Result<(), StftError> {
    let shape = output.shape();
    if shape.is_empty() {
        return Ok(());
    }
    let stride = shape.batch_stride()?;
    for (batch, slab) in output.as_mut_slice().chunks_exact_mut(stride).enumerate() {
        fill_slab(
            signal.row(batch),
            window,
            config.hop_length,
            basis,
            &shape,
            slab,
        );
    }
    Ok(())
}

fn simt_with_basis<T, E>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    capability: &DeviceCapability,
    executor: &E,
    basis: &Basis<T>,
    output: &mut Spectrogram<T>,
) -> Result<(), StftError>
where
    T: Float,
    E: LaneExecutor,
{
    let shape = output.shape();
    let launch = LaunchShape::for_batch(shape.batch, capability)?;
    verbose!(
        debug,
        "stft: simt launch grid={:?} block={:?} for batch={}",
        launch.grid_dim(),
        launch.block_dim(),
        shape.batch
    );
    if shape.is_empty() {
        return Ok(());
    }
    let stride = shape.batch_stride()?;
    let hop_length = config.hop_length;
    executor.launch(&launch, output.as_mut_slice(), stride, |batch, slab| {
        fill_slab(signal.row(batch), window, hop_length, basis, &shape, slab);
    });
    Ok(())
}

/// Sequential (host) strategy.
pub fn sequential<T: Float>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    output: &mut Spectrogram<T>,
) -> Result<(), StftError> {
    validate(signal, window, config, &output.shape())?;
    let basis = Basis::new(window.len());
    sequential_with_basis(signal, window, config, &basis, output)
}

/// SIMT (device) strategy on an arbitrary executor.
///
/// The batch axis is split into blocks of
/// `min(capability.max_lanes_per_block, batch)` lanes; lane `g` computes
/// batch element `g`.
pub fn simt<T, E>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    capability: &DeviceCapability,
    executor: &E,
    output: &mut Spectrogram<T>,
) -> Result<(), StftError>
where
    T: Float,
    E: LaneExecutor,
{
    validate(signal, window, config, &output.shape())?;
    let basis = Basis::new(window.len());
    simt_with_basis(signal, window, config, capability, executor, &basis, output)
}

#[cfg(feature = "parallel")]
/// SIMT strategy on rayon.
///
/// Requires the `parallel` feature. Uses a dedicated pool when
/// `capability.threads` is non-zero, the global pool otherwise.
///
/// # Examples
/// ```
/// use dstft::stft::{parallel, sequential};
/// use dstft::{DeviceCapability, SignalBatch, Spectrogram, SpectrogramShape, StftConfig};
///
/// let data: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
/// let signal = SignalBatch::new(&data, 4, 16).unwrap();
/// let window = vec![1.0f32; 8];
/// let config = StftConfig::new(8, 4, 8);
/// let shape = SpectrogramShape::new(4, 5, 3);
/// let mut a = Spectrogram::zeros(shape).unwrap();
/// let mut b = Spectrogram::zeros(shape).unwrap();
/// sequential(&signal, &window, &config, &mut a).unwrap();
/// parallel(&signal, &window, &config, &DeviceCapability::default(), &mut b).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parallel<T: Float>(
    signal: &SignalBatch<'_, T>,
    window: &[T],
    config: &StftConfig,
    capability: &DeviceCapability,
    output: &mut Spectrogram<T>,
) -> Result<(), StftError> {
    validate(signal, window, config, &output.shape())?;
    let lanes = crate::launch::RayonLanes::for_capability(capability)?;
    let basis = Basis::new(window.len());
    simt_with_basis(signal, window, config, capability, &lanes, &basis, output)
}

/// Backend variant requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Sequential host loop.
    Host,
    /// SIMT launch sized by the given capability. Runs on rayon with the
    /// `parallel` feature and on [`SerialLanes`](crate::launch::SerialLanes)
    /// without it.
    Simt(DeviceCapability),
}

impl Target {
    /// Name under which the variant is registered with a scheduler.
    pub fn tag(&self) -> &'static str {
        match self {
            Target::Host => "stft_host",
            Target::Simt(_) => "stft_simt",
        }
    }
}

/// STFT operator bound to a configuration and an output shape.
///
/// Each [`generate`](StftOperator::generate) call computes the whole output
/// synchronously. Basis tables are cached across calls.
pub struct StftOperator<T: Float> {
    config: StftConfig,
    shape: SpectrogramShape,
    planner: StftPlanner<T>,
    /// Rayon executor for the last requested thread count.
    #[cfg(feature = "parallel")]
    lanes: Option<(usize, crate::launch::RayonLanes)>,
}

impl<T: Float> StftOperator<T> {
    pub fn new(config: StftConfig, shape: SpectrogramShape) -> Self {
        Self {
            config,
            shape,
            planner: StftPlanner::new(),
            #[cfg(feature = "parallel")]
            lanes: None,
        }
    }

    /// Build from a raw `[batch, num_freq_bins, num_frames, 2]` descriptor.
    pub fn with_dims(config: StftConfig, dims: [usize; 4]) -> Result<Self, StftError> {
        Ok(Self::new(config, SpectrogramShape::from_dims(dims)?))
    }

    pub fn config(&self) -> &StftConfig {
        &self.config
    }

    pub fn shape(&self) -> SpectrogramShape {
        self.shape
    }

    /// Allocate the output and fill it.
    pub fn generate(
        &mut self,
        target: &Target,
        signal: &SignalBatch<'_, T>,
        window: &[T],
    ) -> Result<Spectrogram<T>, StftError> {
        let mut output = Spectrogram::zeros(self.shape)?;
        self.generate_into(target, signal, window, &mut output)?;
        Ok(output)
    }

    /// Fill a caller-allocated output, which must have the operator's shape.
    pub fn generate_into(
        &mut self,
        target: &Target,
        signal: &SignalBatch<'_, T>,
        window: &[T],
        output: &mut Spectrogram<T>,
    ) -> Result<(), StftError> {
        check_output_shape(&self.shape, &output.shape())?;
        verbose!(
            debug,
            "stft: {} shape={:?} hop={} win={} n_fft={} (unused)",
            target.tag(),
            self.shape.dims(),
            self.config.hop_length,
            self.config.win_length,
            self.config.n_fft
        );
        let config = self.config;
        validate(signal, window, &config, &self.shape)?;
        let basis = self.planner.basis(config.win_length);
        match target {
            Target::Host => sequential_with_basis(signal, window, &config, &basis, output),
            Target::Simt(capability) => {
                #[cfg(feature = "parallel")]
                let executor = self.rayon_lanes(capability.threads)?;
                #[cfg(not(feature = "parallel"))]
                let executor = &crate::launch::SerialLanes;
                simt_with_basis(signal, window, &config, capability, executor, &basis, output)
            }
        }
    }

    /// Rayon executor for `threads` workers, rebuilt only when the count changes.
    #[cfg(feature = "parallel")]
    fn rayon_lanes(&mut self, threads: usize) -> Result<&crate::launch::RayonLanes, StftError> {
        let stale = !matches!(&self.lanes, Some((cached, _)) if *cached == threads);
        if stale {
            verbose!(debug, "stft: building rayon lanes for {} threads", threads);
            let lanes = crate::launch::RayonLanes::with_threads(threads)?;
            self.lanes = Some((threads, lanes));
        }
        match &self.lanes {
            Some((_, lanes)) => Ok(lanes),
            None => Err(StftError::InvalidValue),
        }
    }
}

/// Compare an output descriptor against the operator's, axis by axis.
fn check_output_shape(
    expected: &SpectrogramShape,
    found: &SpectrogramShape,
) -> Result<(), StftError> {
    let axes = [
        (ShapeAxis::Batch, expected.batch, found.batch),
        (ShapeAxis::FreqBins, expected.num_freq_bins, found.num_freq_bins),
        (ShapeAxis::Frames, expected.num_frames, found.num_frames),
    ];
    match axes.into_iter().find(|&(_, e, f)| e != f) {
        Some((axis, e, f)) => Err(StftError::shape(axis, e, f)),
        None => Ok(()),
    }
}


#[cfg(all(feature = "internal-tests", test))]
mod proptests {
    use super::*;
    use crate::launch::SerialLanes;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_strategies_agree(
            batch in 1usize..6,
            win_length in 0usize..9,
            hop in 0usize..5,
            frames in 0usize..5,
            bins in 0usize..7,
            lanes in 1usize..4,
            seed in proptest::collection::vec(-100.0f64..100.0, 64),
        ) {
            let needed = if frames == 0 { 0 } else { (frames - 1) * hop + win_length };
            let samples = needed.max(1);
            let data: Vec<f64> = (0..batch * samples).map(|i| seed[i % seed.len()] + i as f64).collect();
            let window: Vec<f64> = (0..win_length).map(|i| seed[(i * 7) % seed.len()] / 100.0).collect();
            let signal = SignalBatch::new(&data, batch, samples).unwrap();
            let config = StftConfig::new(win_length, hop, win_length);
            let shape = SpectrogramShape::new(batch, bins, frames);
            let mut a = Spectrogram::zeros(shape).unwrap();
            let mut b = Spectrogram::zeros(shape).unwrap();
            sequential(&signal, &window, &config, &mut a).unwrap();
            let cap = DeviceCapability::new(lanes).unwrap();
            simt(&signal, &window, &config, &cap, &SerialLanes, &mut b).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_zero_signal_gives_zero_output(
            win_length in 1usize..9,
            bins in 1usize..6,
            ref window in proptest::collection::vec(-10.0f32..10.0, 8),
        ) {
            let window = &window[..win_length];
            let data = alloc::vec![0.0f32; win_length * 3];
            let signal = SignalBatch::new(&data, 1, win_length * 3).unwrap();
            let config = StftConfig::new(win_length, win_length, win_length);
            let mut out = Spectrogram::zeros(SpectrogramShape::new(1, bins, 3)).unwrap();
            sequential(&signal, window, &config, &mut out).unwrap();
            prop_assert!(out.as_slice().iter().all(|&v| v == 0.0));
        }
    }
}
