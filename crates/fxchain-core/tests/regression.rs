//! Exact-value regression scenarios for the delay line.

use fxchain_core::signal::{channel_slices, impulse, ramp, to_channels};
use fxchain_core::{DelayLine, ms_to_samples};

const EXPECTED: [f32; 6] = [1.0, 2.0, 3.5, 5.0, 6.75, 8.5];

fn ramp_delay(channels: usize) -> DelayLine {
    let mut delay = DelayLine::new();
    delay.configure(48000.0, channels).unwrap();
    delay.set_delay_samples(2);
    delay.set_feedback(0.5);
    delay
}

#[test]
fn ramp_in_blocks_of_two() {
    for channels in [1, 2] {
        let mut delay = ramp_delay(channels);
        let mut signal = to_channels(&ramp(6, 1.0, 1.0), channels);

        for start in (0..6).step_by(2) {
            let mut block: Vec<&mut [f32]> = signal
                .iter_mut()
                .map(|c| &mut c[start..start + 2])
                .collect();
            delay.process_in_place(&mut block, false);
        }

        for channel in &signal {
            assert_eq!(channel.as_slice(), EXPECTED);
        }
    }
}

#[test]
fn ramp_in_one_block() {
    for channels in [1, 2] {
        let mut delay = ramp_delay(channels);
        let mut signal = to_channels(&ramp(6, 1.0, 1.0), channels);
        delay.process_in_place(&mut channel_slices(&mut signal), false);
        for channel in &signal {
            assert_eq!(channel.as_slice(), EXPECTED);
        }
    }
}

/// With a one-sample delay the impulse reappears at index 1 scaled by the
/// feedback; at unity feedback that is the full 1.0.
#[test]
fn impulse_one_sample_delay() {
    let mut delay = DelayLine::new();
    delay.set_feedback(1.0);
    delay.configure(44100.0, 2).unwrap();
    delay.set_delay_samples(1);

    let mut signal = to_channels(&impulse(8, 1.0), 2);
    delay.process_in_place(&mut channel_slices(&mut signal), false);
    for channel in &signal {
        assert_eq!(channel[0], 1.0);
        assert_eq!(channel[1], 1.0);
    }
}

#[test]
fn doubling_rate_doubles_delay() {
    let mut delay = DelayLine::new();
    delay.configure(48000.0, 2).unwrap();
    delay.set_delay_samples(ms_to_samples(1.0, 48000.0));
    let original = delay.delay_samples();
    assert_eq!(original, 48);

    delay.configure(96000.0, 2).unwrap();
    assert_eq!(delay.delay_samples(), 2 * original);

    let mut delay = DelayLine::new();
    delay.configure(48000.0, 2).unwrap();
    delay.set_delay_samples(24000);
    delay.configure(96000.0, 2).unwrap();
    assert_eq!(delay.delay_samples(), 48000);
}

#[test]
fn channel_count_change_keeps_delay() {
    let mut delay = DelayLine::new();
    delay.configure(48000.0, 2).unwrap();
    delay.set_delay_ms(250.0);
    delay.configure(48000.0, 6).unwrap();
    assert_eq!(delay.num_channels(), 6);
    assert_eq!(delay.delay_samples(), 12000);
}
