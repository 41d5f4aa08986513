//! Demonstrates enabling verbose logging for dstft.
use dstft::{DeviceCapability, SignalBatch, StftConfig, StftOperator, Target};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let signal = [1.0, 2.0, 3.0, 4.0];
    let window = [1.0, 1.0];
    let mut op = StftOperator::with_dims(StftConfig::new(2, 2, 2), [1, 2, 2, 2]).unwrap();
    let batch = SignalBatch::single(&signal);

    op.generate(&Target::Host, &batch, &window).unwrap();
    op.generate(&Target::Simt(DeviceCapability::default()), &batch, &window)
        .unwrap();
}
