// Test intent: the verbose-logging feature emits through `log` without changing results.
#![cfg(feature = "verbose-logging")]

use dstft::{DeviceCapability, SignalBatch, StftConfig, StftOperator, Target};

#[test]
fn logging_enabled_run() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
    let data = [1.0f32, 2.0, 3.0, 4.0];
    let signal = SignalBatch::single(&data);
    let mut op = StftOperator::with_dims(StftConfig::new(2, 2, 2), [1, 2, 2, 2]).unwrap();
    let host = op.generate(&Target::Host, &signal, &[1.0, 1.0]).unwrap();
    let simt = op
        .generate(&Target::Simt(DeviceCapability::default()), &signal, &[1.0, 1.0])
        .unwrap();
    assert_eq!(host, simt);
    assert!(op
        .generate(&Target::Host, &signal, &[1.0, 1.0, 1.0])
        .is_err());
}
