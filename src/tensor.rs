//! Row-major views over the kernel's input and output tensors.
//!
//! The signal is `[batch, samples]`; the spectrogram is
//! `[batch, num_freq_bins, num_frames, 2]` with `(real, imag)` interleaved
//! on the last axis.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{ShapeAxis, StftError};
use crate::num::{Complex, Float};

/// Length of the trailing `(real, imag)` axis.
pub const COMPLEX_CHANNELS: usize = 2;

/// Borrowed `[batch, samples]` signal tensor.
#[derive(Debug, Clone, Copy)]
pub struct SignalBatch<'a, T> {
    data: &'a [T],
    batch: usize,
    samples: usize,
}

impl<'a, T> SignalBatch<'a, T> {
    pub fn new(data: &'a [T], batch: usize, samples: usize) -> Result<Self, StftError> {
        let expected = batch.checked_mul(samples).ok_or(StftError::Overflow)?;
        if data.len() != expected {
            return Err(StftError::shape(
                ShapeAxis::SignalBuffer,
                expected,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            batch,
            samples,
        })
    }

    /// A batch holding one signal.
    pub fn single(data: &'a [T]) -> Self {
        Self {
            data,
            batch: 1,
            samples: data.len(),
        }
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Samples of signal `b`.
    ///
    /// # Panics
    /// If `b >= batch`.
    pub fn row(&self, b: usize) -> &'a [T] {
        let start = b * self.samples;
        &self.data[start..start + self.samples]
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

/// Output descriptor `[batch, num_freq_bins, num_frames, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrogramShape {
    pub batch: usize,
    pub num_freq_bins: usize,
    pub num_frames: usize,
}

impl SpectrogramShape {
    pub fn new(batch: usize, num_freq_bins: usize, num_frames: usize) -> Self {
        Self {
            batch,
            num_freq_bins,
            num_frames,
        }
    }

    /// Accept a caller-supplied 4-D shape, checking the complex axis.
    pub fn from_dims(dims: [usize; 4]) -> Result<Self, StftError> {
        let [batch, num_freq_bins, num_frames, channels] = dims;
        if channels != COMPLEX_CHANNELS {
            return Err(StftError::shape(
                ShapeAxis::ComplexChannels,
                COMPLEX_CHANNELS,
                channels,
            ));
        }
        Ok(Self::new(batch, num_freq_bins, num_frames))
    }

    pub fn dims(&self) -> [usize; 4] {
        [
            self.batch,
            self.num_freq_bins,
            self.num_frames,
            COMPLEX_CHANNELS,
        ]
    }

    /// Scalars owned by one batch element: `num_freq_bins * num_frames * 2`.
    pub fn batch_stride(&self) -> Result<usize, StftError> {
        self.num_freq_bins
            .checked_mul(self.num_frames)
            .and_then(|cells| cells.checked_mul(COMPLEX_CHANNELS))
            .ok_or(StftError::Overflow)
    }

    /// Total scalar count of the output tensor.
    pub fn len(&self) -> Result<usize, StftError> {
        self.batch_stride()?
            .checked_mul(self.batch)
            .ok_or(StftError::Overflow)
    }

    pub fn is_empty(&self) -> bool {
        self.batch == 0 || self.num_freq_bins == 0 || self.num_frames == 0
    }

    /// Offset of the real part of cell `(freq, frame)` inside one batch slab.
    #[inline(always)]
    pub(crate) fn cell_offset(&self, freq: usize, frame: usize) -> usize {
        (freq * self.num_frames + frame) * COMPLEX_CHANNELS
    }
}

/// Owned output spectrogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram<T: Float> {
    data: Vec<T>,
    shape: SpectrogramShape,
}

impl<T: Float> Spectrogram<T> {
    pub fn zeros(shape: SpectrogramShape) -> Result<Self, StftError> {
        Ok(Self {
            data: vec![T::zero(); shape.len()?],
            shape,
        })
    }

    /// Wrap a caller-allocated buffer, which must match the shape exactly.
    pub fn from_vec(shape: SpectrogramShape, data: Vec<T>) -> Result<Self, StftError> {
        let expected = shape.len()?;
        if data.len() != expected {
            return Err(StftError::shape(
                ShapeAxis::OutputBuffer,
                expected,
                data.len(),
            ));
        }
        Ok(Self { data, shape })
    }

    pub fn shape(&self) -> SpectrogramShape {
        self.shape
    }

    /// Coefficient at `(batch, freq, frame)`.
    ///
    /// # Panics
    /// If any index is out of range.
    pub fn get(&self, batch: usize, freq: usize, frame: usize) -> Complex<T> {
        assert!(
            batch < self.shape.batch
                && freq < self.shape.num_freq_bins
                && frame < self.shape.num_frames,
            "index ({batch}, {freq}, {frame}) out of range for {:?}",
            self.shape.dims()
        );
        let stride = self.shape.num_freq_bins * self.shape.num_frames * COMPLEX_CHANNELS;
        let i = batch * stride + self.shape.cell_offset(freq, frame);
        Complex::new(self.data[i], self.data[i + 1])
    }

    /// Interleaved scalars of one batch element, `[num_freq_bins, num_frames, 2]`.
    ///
    /// # Panics
    /// If `batch` is out of range.
    pub fn batch_slab(&self, batch: usize) -> &[T] {
        assert!(
            batch < self.shape.batch,
            "batch {batch} out of range for {:?}",
            self.shape.dims()
        );
        let stride = self.shape.num_freq_bins * self.shape.num_frames * COMPLEX_CHANNELS;
        &self.data[batch * stride..(batch + 1) * stride]
    }

    /// Magnitude `|X|` of every cell, shaped `[batch, num_freq_bins, num_frames]`.
    pub fn magnitudes(&self) -> Vec<T> {
        self.data
            .chunks_exact(COMPLEX_CHANNELS)
            .map(|c| Complex::new(c[0], c[1]).norm())
            .collect()
    }

    /// Power `|X|²` of every cell, shaped `[batch, num_freq_bins, num_frames]`.
    pub fn power(&self) -> Vec<T> {
        self.data
            .chunks_exact(COMPLEX_CHANNELS)
            .map(|c| Complex::new(c[0], c[1]).norm_sqr())
            .collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}
