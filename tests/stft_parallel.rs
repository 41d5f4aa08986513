// Test intent: ensures the rayon-backed SIMT strategy reproduces the sequential strategy.
#![cfg(feature = "parallel")]

use dstft::launch::{LaneExecutor, LaunchShape, RayonLanes};
use dstft::stft::{parallel, sequential, simt};
use dstft::{
    DeviceCapability, SignalBatch, Spectrogram, SpectrogramShape, StftConfig, StftError,
    StftOperator, Target,
};

/// Batch large enough to span several blocks with small lane limits.
const BATCH: usize = 33;
/// Samples per signal.
const SAMPLES: usize = 128;
/// Window length.
const WIN_LEN: usize = 32;
/// Hop length.
const HOP_LEN: usize = 16;
/// Frames that fit in `SAMPLES`.
const FRAMES: usize = (SAMPLES - WIN_LEN) / HOP_LEN + 1;
/// One-sided bin count for `WIN_LEN`.
const BINS: usize = WIN_LEN / 2 + 1;

fn signal_data() -> Vec<f64> {
    (0..BATCH * SAMPLES)
        .map(|i| {
            let b = (i / SAMPLES) as f64;
            let t = (i % SAMPLES) as f64;
            (t * 0.05 * (b + 1.0)).sin() + 0.25 * (t * 0.3).cos()
        })
        .collect()
}

fn window() -> Vec<f64> {
    (0..WIN_LEN)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / WIN_LEN as f64).cos())
        .collect()
}

/// Parallel output is identical to sequential output across lane limits and pool sizes.
#[test]
fn parallel_matches_sequential() {
    let data = signal_data();
    let window = window();
    let signal = SignalBatch::new(&data, BATCH, SAMPLES).unwrap();
    let config = StftConfig::new(WIN_LEN, HOP_LEN, WIN_LEN);
    let shape = SpectrogramShape::new(BATCH, BINS, FRAMES);
    let mut expected = Spectrogram::zeros(shape).unwrap();
    sequential(&signal, &window, &config, &mut expected).unwrap();

    for (lanes, threads) in [(1, 0), (4, 2), (32, 3), (1024, 0), (5, 1)] {
        let cap = DeviceCapability::new(lanes).unwrap().with_threads(threads);
        let mut got = Spectrogram::zeros(shape).unwrap();
        parallel(&signal, &window, &config, &cap, &mut got).unwrap();
        assert_eq!(got, expected, "lanes={lanes} threads={threads}");
    }
}

/// The operator's SIMT target runs on rayon and agrees with the host target.
#[test]
fn operator_simt_target_matches_host() {
    let data = signal_data();
    let window = window();
    let signal = SignalBatch::new(&data, BATCH, SAMPLES).unwrap();
    let mut op = StftOperator::with_dims(
        StftConfig::new(WIN_LEN, HOP_LEN, WIN_LEN),
        [BATCH, BINS, FRAMES, 2],
    )
    .unwrap();
    let host = op.generate(&Target::Host, &signal, &window).unwrap();
    let device = op
        .generate(
            &Target::Simt(DeviceCapability::new(8).unwrap()),
            &signal,
            &window,
        )
        .unwrap();
    assert_eq!(host, device);
}

/// Rayon lanes each receive their own slab and skip idle tail lanes.
#[test]
fn rayon_lanes_cover_batch_once() {
    let cap = DeviceCapability::new(4).unwrap();
    let shape = LaunchShape::for_batch(10, &cap).unwrap();
    let mut out = vec![usize::MAX; 10 * 2];
    RayonLanes::new().launch(&shape, &mut out, 2, |batch, slab| {
        slab[0] = batch;
        slab[1] = batch * 2;
    });
    for b in 0..10 {
        assert_eq!(out[2 * b], b);
        assert_eq!(out[2 * b + 1], b * 2);
    }
}

/// Parallel validation matches the sequential preconditions.
#[test]
fn parallel_rejects_out_of_bounds() {
    let data = signal_data();
    let window = window();
    let signal = SignalBatch::new(&data, BATCH, SAMPLES).unwrap();
    let shape = SpectrogramShape::new(BATCH, BINS, FRAMES + 2);
    let mut out = Spectrogram::zeros(shape).unwrap();
    let res = parallel(
        &signal,
        &window,
        &StftConfig::new(WIN_LEN, HOP_LEN, WIN_LEN),
        &DeviceCapability::default(),
        &mut out,
    );
    assert_eq!(
        res,
        Err(StftError::SignalOutOfBounds {
            required: SAMPLES + 2 * HOP_LEN,
            available: SAMPLES
        })
    );
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
}

/// Randomised parity between the rayon and serial lane executors.
#[cfg(feature = "internal-tests")]
#[test]
fn random_inputs_agree() {
    use dstft::launch::SerialLanes;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..16 {
        let batch = rng.gen_range(1..20);
        let win = rng.gen_range(1..12);
        let hop = rng.gen_range(1..6);
        let frames = rng.gen_range(1..6);
        let samples = (frames - 1) * hop + win + rng.gen_range(0..4);
        let bins = rng.gen_range(1..10);
        let data: Vec<f32> = (0..batch * samples)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        let window: Vec<f32> = (0..win).map(|_| rng.gen_range(0.0..1.0)).collect();
        let signal = SignalBatch::new(&data, batch, samples).unwrap();
        let config = StftConfig::new(win, hop, win);
        let shape = SpectrogramShape::new(batch, bins, frames);
        let cap = DeviceCapability::new(rng.gen_range(1..8)).unwrap();
        let mut a = Spectrogram::zeros(shape).unwrap();
        let mut b = Spectrogram::zeros(shape).unwrap();
        simt(&signal, &window, &config, &cap, &SerialLanes, &mut a).unwrap();
        simt(&signal, &window, &config, &cap, &RayonLanes::new(), &mut b).unwrap();
        assert_eq!(a, b);
    }
}
