// Test intent: checks sequential STFT output against the defining sums and edge cases.

use dstft::stft::sequential;
use dstft::{SignalBatch, Spectrogram, SpectrogramShape, StftConfig, StftError};

/// Relative tolerance for f64 comparisons against the reference sum.
const EPSILON: f64 = 1e-9;
/// Samples per signal in the synthetic batches.
const SAMPLES: usize = 40;
/// Window length used by the closed-form checks.
const WIN_LEN: usize = 8;
/// Hop between consecutive frames.
const HOP_LEN: usize = 4;

/// Defining sums evaluated without any phase reduction or tables.
fn reference(row: &[f64], window: &[f64], start: usize, k: usize) -> (f64, f64) {
    let n = window.len() as f64;
    window
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (w, &c)| {
            let angle = 2.0 * std::f64::consts::PI * (k * w) as f64 / n;
            let v = c * row[start + w];
            (re + v * angle.cos(), im - v * angle.sin())
        })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * (1.0 + b.abs())
}

fn test_batch(batch: usize) -> Vec<f64> {
    (0..batch * SAMPLES)
        .map(|i| (i as f64 * 0.21).sin() * 3.0 + (i % 7) as f64 * 0.5)
        .collect()
}

fn hann(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / len as f64).cos())
        .collect()
}

/// Every cell matches the closed-form windowed DFT.
#[test]
fn matches_closed_form() {
    let batch = 3;
    let data = test_batch(batch);
    let signal = SignalBatch::new(&data, batch, SAMPLES).unwrap();
    let window = hann(WIN_LEN);
    let config = StftConfig::new(WIN_LEN, HOP_LEN, WIN_LEN);
    let frames = (SAMPLES - WIN_LEN) / HOP_LEN + 1;
    let shape = SpectrogramShape::new(batch, WIN_LEN + 3, frames);
    let mut out = Spectrogram::zeros(shape).unwrap();
    sequential(&signal, &window, &config, &mut out).unwrap();

    for b in 0..batch {
        for k in 0..shape.num_freq_bins {
            for f in 0..frames {
                let (re, im) = reference(signal.row(b), &window, f * HOP_LEN, k);
                let got = out.get(b, k, f);
                assert!(close(got.re, re), "re ({b},{k},{f}): {} vs {re}", got.re);
                assert!(close(got.im, im), "im ({b},{k},{f}): {} vs {im}", got.im);
            }
        }
    }
}

/// The four-sample worked example.
#[test]
fn four_sample_example() {
    let data = [1.0f64, 2.0, 3.0, 4.0];
    let signal = SignalBatch::new(&data, 1, 4).unwrap();
    let mut out = Spectrogram::zeros(SpectrogramShape::new(1, 2, 2)).unwrap();
    sequential(&signal, &[1.0, 1.0], &StftConfig::new(2, 2, 2), &mut out).unwrap();
    let expected = [(0, 0, 3.0), (1, 0, -1.0), (0, 1, 7.0), (1, 1, -1.0)];
    for (k, f, re) in expected {
        let c = out.get(0, k, f);
        assert!((c.re - re).abs() < 1e-12, "({k},{f}) re {}", c.re);
        assert!(c.im.abs() < 1e-12, "({k},{f}) im {}", c.im);
    }
}

/// A zero-length window produces an all-zero spectrogram.
#[test]
fn zero_window_length() {
    let data = test_batch(2);
    let signal = SignalBatch::new(&data, 2, SAMPLES).unwrap();
    let shape = SpectrogramShape::new(2, 4, 5);
    let mut out = Spectrogram::from_vec(shape, vec![7.0; shape.len().unwrap()]).unwrap();
    sequential(&signal, &[], &StftConfig::new(0, HOP_LEN, 0), &mut out).unwrap();
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
}

/// An all-zero signal gives all-zero output regardless of the window.
#[test]
fn zero_signal() {
    let data = vec![0.0f32; 2 * SAMPLES];
    let signal = SignalBatch::new(&data, 2, SAMPLES).unwrap();
    let window: Vec<f32> = (0..WIN_LEN).map(|i| i as f32 - 3.5).collect();
    let shape = SpectrogramShape::new(2, 5, 9);
    let mut out = Spectrogram::zeros(shape).unwrap();
    sequential(&signal, &window, &StftConfig::new(16, HOP_LEN, WIN_LEN), &mut out).unwrap();
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
}

/// Bin 0 has no imaginary part and its real part is the windowed frame sum.
#[test]
fn dc_bin() {
    let data = test_batch(1);
    let signal = SignalBatch::single(&data);
    let window = hann(WIN_LEN);
    let frames = 5;
    let mut out = Spectrogram::zeros(SpectrogramShape::new(1, 3, frames)).unwrap();
    sequential(&signal, &window, &StftConfig::new(WIN_LEN, HOP_LEN, WIN_LEN), &mut out).unwrap();
    for f in 0..frames {
        let start = f * HOP_LEN;
        let sum: f64 = window
            .iter()
            .zip(&data[start..start + WIN_LEN])
            .map(|(w, x)| w * x)
            .sum();
        let c = out.get(0, 0, f);
        assert_eq!(c.im, 0.0);
        assert!(close(c.re, sum), "frame {f}: {} vs {sum}", c.re);
    }
}

/// A pure tone concentrates energy in its own bin.
#[test]
fn tone_peaks_in_its_bin() {
    let n = 16;
    let bin = 3;
    let data: Vec<f32> = (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32).cos())
        .collect();
    let signal = SignalBatch::single(&data);
    let mut out = Spectrogram::zeros(SpectrogramShape::new(1, n / 2 + 1, 1)).unwrap();
    sequential(&signal, &vec![1.0; n], &StftConfig::new(n, n, n), &mut out).unwrap();
    let mags = out.magnitudes();
    let peak = mags
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap()
        .0;
    assert_eq!(peak, bin);
    assert!((mags[bin] - n as f32 / 2.0).abs() < 1e-3);
}

/// Frames reaching past the signal end are rejected before any write.
#[test]
fn rejects_out_of_bounds_frames() {
    let data = [1.0f32, 2.0, 3.0, 4.0];
    let signal = SignalBatch::single(&data);
    let shape = SpectrogramShape::new(1, 2, 2);
    let mut out = Spectrogram::from_vec(shape, vec![5.0; 8]).unwrap();
    let res = sequential(&signal, &[1.0, 1.0, 1.0], &StftConfig::new(3, 2, 3), &mut out);
    assert_eq!(
        res,
        Err(StftError::SignalOutOfBounds {
            required: 5,
            available: 4
        })
    );
    assert!(out.as_slice().iter().all(|&v| v == 5.0));
}

/// The last frame may end exactly at the final sample.
#[test]
fn accepts_frame_ending_at_signal_end() {
    let data = [1.0f32, 2.0, 3.0, 4.0, 5.0];
    let signal = SignalBatch::single(&data);
    let mut out = Spectrogram::zeros(SpectrogramShape::new(1, 1, 2)).unwrap();
    sequential(&signal, &[1.0, 1.0, 1.0], &StftConfig::new(3, 2, 3), &mut out).unwrap();
    assert_eq!(out.get(0, 0, 1).re, 12.0);
}

/// `n_fft` does not influence the result.
#[test]
fn n_fft_is_ignored() {
    let data = test_batch(1);
    let signal = SignalBatch::single(&data);
    let window = hann(WIN_LEN);
    let shape = SpectrogramShape::new(1, 4, 3);
    let mut a = Spectrogram::zeros(shape).unwrap();
    let mut b = Spectrogram::zeros(shape).unwrap();
    sequential(&signal, &window, &StftConfig::new(8, HOP_LEN, WIN_LEN), &mut a).unwrap();
    sequential(&signal, &window, &StftConfig::new(1024, HOP_LEN, WIN_LEN), &mut b).unwrap();
    assert_eq!(a, b);
}
