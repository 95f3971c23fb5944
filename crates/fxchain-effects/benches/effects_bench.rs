//! Criterion benchmarks for fxchain-effects stages and the full chain
//!
//! Run with: cargo bench -p fxchain-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fxchain_core::signal::{channel_slices, sine, to_channels};
use fxchain_core::{Stage, StreamConfig};
use fxchain_effects::{
    ChainSettings, DelayStage, EffectChain, FilterStage, GainStage, ReverbStage,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn bench_stage(c: &mut Criterion, name: &str, make: impl Fn() -> Box<dyn Stage>) {
    let mut group = c.benchmark_group(name);

    for &block_size in BLOCK_SIZES {
        let input = to_channels(&sine(block_size, 440.0, SAMPLE_RATE, 0.5), 2);
        let config = StreamConfig::new(f64::from(SAMPLE_RATE), 2, block_size).unwrap();

        group.bench_with_input(
            BenchmarkId::new("stereo", block_size),
            &block_size,
            |b, _| {
                let mut stage = make();
                stage.configure(&config);
                let mut buffer = input.clone();
                b.iter(|| {
                    buffer.clone_from(&input);
                    stage.apply_pending_changes();
                    stage.process(black_box(&mut channel_slices(&mut buffer)), false);
                });
            },
        );
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    bench_stage(c, "FilterStage", || Box::new(FilterStage::default()));
    bench_stage(c, "DelayStage", || Box::new(DelayStage::default()));
    bench_stage(c, "ReverbStage", || Box::new(ReverbStage::default()));
    bench_stage(c, "GainStage", || Box::new(GainStage::new(6.0)));
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("EffectChain");

    for &block_size in BLOCK_SIZES {
        let input = to_channels(&sine(block_size, 440.0, SAMPLE_RATE, 0.5), 2);

        group.bench_with_input(
            BenchmarkId::new("standard_stereo", block_size),
            &block_size,
            |b, &block_size| {
                let mut chain = EffectChain::standard(&ChainSettings::default());
                chain
                    .configure(f64::from(SAMPLE_RATE), 2, block_size)
                    .unwrap();
                let control = chain.control().clone();
                let mut buffer = input.clone();
                let mut gain = 0.0;
                b.iter(|| {
                    // keep the gain ramp running
                    gain = if gain == 0.0 { -6.0 } else { 0.0 };
                    control.set_gain_db(gain);
                    buffer.clone_from(&input);
                    chain.apply_pending_parameter_changes();
                    chain
                        .process_block(black_box(&mut channel_slices(&mut buffer)), false)
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_chain);
criterion_main!(benches);
