//! Windowed DFT by direct summation.
//!
//! One call produces one spectral coefficient of one frame:
//!
//! ```text
//! re =  Σ window[w] * x[start + w] * cos(2π k w / N)
//! im = -Σ window[w] * x[start + w] * sin(2π k w / N)
//! ```
//!
//! with `N = window.len()`. There is no FFT decomposition; a full STFT costs
//! `O(batch * bins * frames * N)`.

use alloc::vec::Vec;

use crate::num::{Complex, Float};

/// Index into the `N` distinct basis phases for bin `freq_index`, sample `w`.
///
/// The basis is periodic in `freq_index * w` with period `N`, so the product
/// is reduced before it becomes a float.
#[inline(always)]
fn phase_index(freq_index: usize, w: usize, win_length: usize) -> usize {
    ((freq_index % win_length) * w) % win_length
}

#[inline(always)]
fn phase_angle<T: Float>(phase: usize, win_length: usize) -> T {
    T::two_pi() * T::from_usize(phase) / T::from_usize(win_length)
}

/// Project one frame of `signal` onto bin `freq_index`.
///
/// The frame is `signal[frame_start..frame_start + window.len()]`. An empty
/// window yields `0 + 0i`.
///
/// # Panics
/// If the frame runs past the end of `signal`. The STFT entry points validate
/// offsets before calling this.
pub fn windowed_dft<T: Float>(
    signal: &[T],
    window: &[T],
    frame_start: usize,
    freq_index: usize,
) -> Complex<T> {
    let win_length = window.len();
    if win_length == 0 {
        return Complex::zero();
    }
    let frame = &signal[frame_start..frame_start + win_length];
    let mut acc = Complex::zero();
    for (w, (&x, &coeff)) in frame.iter().zip(window).enumerate() {
        let (sin, cos) =
            phase_angle::<T>(phase_index(freq_index, w, win_length), win_length).sin_cos();
        let v = coeff * x;
        acc.re = acc.re + v * cos;
        acc.im = acc.im - v * sin;
    }
    acc
}

/// Precomputed `cos`/`sin` of the `N` basis phases for a window length `N`.
///
/// [`Basis::project`] evaluates exactly the same sum as [`windowed_dft`]
/// with table lookups in place of per-sample trigonometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Basis<T: Float> {
    cos: Vec<T>,
    sin: Vec<T>,
}

impl<T: Float> Basis<T> {
    pub fn new(win_length: usize) -> Self {
        let mut cos = Vec::with_capacity(win_length);
        let mut sin = Vec::with_capacity(win_length);
        for phase in 0..win_length {
            let (s, c) = phase_angle::<T>(phase, win_length).sin_cos();
            cos.push(c);
            sin.push(s);
        }
        Self { cos, sin }
    }

    pub fn win_length(&self) -> usize {
        self.cos.len()
    }

    /// Same contract as [`windowed_dft`]; `window.len()` must equal
    /// [`Basis::win_length`].
    pub fn project(
        &self,
        signal: &[T],
        window: &[T],
        frame_start: usize,
        freq_index: usize,
    ) -> Complex<T> {
        let win_length = self.win_length();
        debug_assert_eq!(window.len(), win_length);
        if win_length == 0 {
            return Complex::zero();
        }
        let frame = &signal[frame_start..frame_start + win_length];
        let mut acc = Complex::zero();
        for (w, (&x, &coeff)) in frame.iter().zip(window).enumerate() {
            let p = phase_index(freq_index, w, win_length);
            let v = coeff * x;
            acc.re = acc.re + v * self.cos[p];
            acc.im = acc.im - v * self.sin[p];
        }
        acc
    }
}
