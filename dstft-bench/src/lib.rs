//! Shared fixtures for the dstft benchmarks.

use dstft::{SpectrogramShape, StftConfig};

/// Batch of deterministic multi-tone signals, `[batch, samples]` row-major.
pub fn tone_batch(batch: usize, samples: usize) -> Vec<f32> {
    (0..batch * samples)
        .map(|i| {
            let b = (i / samples) as f32;
            let t = (i % samples) as f32;
            (t * 0.01 * (b + 1.0)).sin() + 0.3 * (t * 0.17).cos()
        })
        .collect()
}

/// Periodic Hann window.
pub fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / len as f32).cos())
        .collect()
}

/// One-sided output shape covering every whole frame of `samples`.
pub fn full_shape(batch: usize, samples: usize, config: &StftConfig) -> SpectrogramShape {
    let frames = if samples < config.win_length || config.hop_length == 0 {
        0
    } else {
        (samples - config.win_length) / config.hop_length + 1
    };
    SpectrogramShape::new(batch, config.onesided_freq_bins(), frames)
}
