//! Criterion benchmarks for fxchain-core primitives
//!
//! Run with: cargo bench -p fxchain-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fxchain_core::signal::{channel_slices, sine, to_channels};
use fxchain_core::{
    AllpassFilter, CombFilter, DelayLine, FilterMode, FirstOrderCoefficients, FirstOrderState,
    LinearSmoothedParam,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_delay_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("DelayLine");

    for &block_size in BLOCK_SIZES {
        let input = to_channels(&sine(block_size, 440.0, SAMPLE_RATE, 0.5), 2);

        group.bench_with_input(
            BenchmarkId::new("stereo_500ms", block_size),
            &block_size,
            |b, _| {
                let mut delay = DelayLine::new();
                delay.configure(f64::from(SAMPLE_RATE), 2).unwrap();
                delay.set_delay_ms(500.0);
                delay.set_feedback(0.5);
                let mut buffer = input.clone();
                b.iter(|| {
                    buffer.clone_from(&input);
                    delay.process_in_place(black_box(&mut channel_slices(&mut buffer)), false);
                });
            },
        );
    }

    group.finish();
}

fn bench_first_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("FirstOrder");

    for &block_size in BLOCK_SIZES {
        let input = sine(block_size, 440.0, SAMPLE_RATE, 0.5);
        let coeffs =
            FirstOrderCoefficients::new(FilterMode::LowPass, 200.0, f64::from(SAMPLE_RATE));

        group.bench_with_input(
            BenchmarkId::new("lowpass", block_size),
            &block_size,
            |b, _| {
                let mut state = FirstOrderState::default();
                b.iter(|| {
                    for &sample in &input {
                        black_box(state.process(&coeffs, black_box(sample)));
                    }
                });
            },
        );
    }

    group.bench_function("coefficient_calc", |b| {
        b.iter(|| {
            black_box(FirstOrderCoefficients::new(
                black_box(FilterMode::HighPass),
                black_box(1000.0),
                black_box(48000.0),
            ))
        });
    });

    group.finish();
}

fn bench_reverb_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("ReverbPrimitives");
    let input = sine(1024, 440.0, SAMPLE_RATE, 0.5);

    group.bench_function("comb_1116", |b| {
        let mut comb = CombFilter::new(1116);
        b.iter(|| {
            for &sample in &input {
                black_box(comb.process(black_box(sample), 0.84, 0.2));
            }
        });
    });

    group.bench_function("allpass_556", |b| {
        let mut allpass = AllpassFilter::new(556);
        b.iter(|| {
            for &sample in &input {
                black_box(allpass.process(black_box(sample)));
            }
        });
    });

    group.finish();
}

fn bench_linear_ramp(c: &mut Criterion) {
    c.bench_function("LinearSmoothedParam/1024", |b| {
        let mut param = LinearSmoothedParam::new(0.0);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            param.set_target(if flip { 1.0 } else { 0.0 }, 480);
            for _ in 0..1024 {
                black_box(param.next_value());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_delay_line,
    bench_first_order,
    bench_reverb_primitives,
    bench_linear_ramp,
);
criterion_main!(benches);
