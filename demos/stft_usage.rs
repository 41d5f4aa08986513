//! STFT usage example for dstft.
//! Computes a small spectrogram with both strategies and prints the peak bins.
//! Run with `cargo run --example stft_usage` (add `--features parallel` for rayon).

#[cfg(not(feature = "parallel"))]
use dstft::launch::SerialLanes;
use dstft::stft::sequential;
#[cfg(not(feature = "parallel"))]
use dstft::stft::simt;
use dstft::{DeviceCapability, SignalBatch, Spectrogram, SpectrogramShape, StftConfig, StftError};

fn main() -> Result<(), StftError> {
    let sample_rate = 8_000.0f32;
    let samples = 1024;
    let win_length = 256;
    let hop_length = 128;
    let tones = [440.0f32, 1_000.0, 2_500.0];

    let data: Vec<f32> = tones
        .iter()
        .flat_map(|&hz| {
            (0..samples)
                .map(move |i| (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate).sin())
        })
        .collect();
    let signal = SignalBatch::new(&data, tones.len(), samples)?;
    let window: Vec<f32> = (0..win_length)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / win_length as f32).cos())
        .collect();
    let config = StftConfig::new(win_length, hop_length, win_length);
    let num_frames = (samples - win_length) / hop_length + 1;
    let shape = SpectrogramShape::new(tones.len(), config.onesided_freq_bins(), num_frames);

    let mut host = Spectrogram::zeros(shape)?;
    sequential(&signal, &window, &config, &mut host)?;

    let capability = DeviceCapability::new(2)?;
    let mut device = Spectrogram::zeros(shape)?;
    #[cfg(feature = "parallel")]
    dstft::stft::parallel(&signal, &window, &config, &capability, &mut device)?;
    #[cfg(not(feature = "parallel"))]
    simt(&signal, &window, &config, &capability, &SerialLanes, &mut device)?;
    assert_eq!(host, device);

    let mags = host.magnitudes();
    let cells = shape.num_freq_bins * shape.num_frames;
    for (b, hz) in tones.iter().enumerate() {
        // magnitudes are [batch, freq, frame]; look at frame 0
        let peak = (0..shape.num_freq_bins)
            .max_by(|&x, &y| {
                let mx = mags[b * cells + x * shape.num_frames];
                let my = mags[b * cells + y * shape.num_frames];
                mx.total_cmp(&my)
            })
            .unwrap_or(0);
        let peak_hz = peak as f32 * sample_rate / win_length as f32;
        println!("tone {hz:>7.1} Hz -> peak bin {peak:>3} (~{peak_hz:.1} Hz)");
    }
    Ok(())
}
