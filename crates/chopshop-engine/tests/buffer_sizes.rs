//! Buffer size robustness tests for the engine.
//!
//! Every cut procedure, with crusher and comb engaged, must process audio
//! without panics, NaN or infinity at buffer sizes from 1 to 4096 samples.

use chopshop_core::TransportSnapshot;
use chopshop_engine::{Kernel, ParameterId, ParameterState};

const BUFFER_SIZES: &[usize] = &[1, 2, 7, 32, 64, 128, 256, 512, 1024, 2048, 4096];
const SAMPLE_RATE: f64 = 48000.0;
const PROCS: [f64; 3] = [0.0, 0.5, 1.0];

fn is_finite_buffer(buf: &[f32]) -> bool {
    buf.iter().all(|s| s.is_finite())
}

/// Kernel with every stage on and aggressive settings for `proc`.
fn busy_kernel(proc: f64) -> Kernel {
    let mut state = ParameterState::default();
    state.set(ParameterId::CutProc, proc);
    state.set(ParameterId::SubDiv, 1.0);
    state.set(ParameterId::MinPhrase, 0.0);
    state.set(ParameterId::MaxPitch, 1.0);
    state.set(ParameterId::Duty, 0.5);
    state.set(ParameterId::Fade, 0.1);
    state.set(ParameterId::Crusher, 1.0);
    state.set(ParameterId::CrusherMinBits, 0.0);
    state.set(ParameterId::Comb, 1.0);
    state.set(ParameterId::CombFeedback, 1.0);

    let mut kernel = Kernel::new(SAMPLE_RATE);
    for (id, value) in state.iter() {
        kernel.set_normalized(id, value);
    }
    kernel
}

#[test]
fn all_procs_buffer_sizes_stereo() {
    for proc in PROCS {
        for &size in BUFFER_SIZES {
            let mut kernel = busy_kernel(proc);
            let left_in: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();
            let right_in = left_in.clone();
            let mut left_out = vec![0.0f32; size];
            let mut right_out = vec![0.0f32; size];

            let mut ppq = 0.0;
            for _ in 0..8 {
                let transport = TransportSnapshot::playing(174.0, ppq);
                kernel.process([&left_in, &right_in], [&mut left_out, &mut right_out], &transport);
                ppq += transport.quarter_notes(size, SAMPLE_RATE);
            }

            assert!(
                is_finite_buffer(&left_out),
                "proc {proc} produced non-finite left output at buffer size {size}"
            );
            assert!(
                is_finite_buffer(&right_out),
                "proc {proc} produced non-finite right output at buffer size {size}"
            );
        }
    }
}

#[test]
fn mismatched_buffers_use_shortest() {
    let mut kernel = busy_kernel(0.0);
    let input = vec![0.25f32; 64];
    let mut left_out = vec![9.0f32; 64];
    let mut right_out = vec![9.0f32; 32];
    kernel.process(
        [&input, &input],
        [&mut left_out, &mut right_out],
        &TransportSnapshot::default(),
    );
    assert!(left_out[32..].iter().all(|&s| s == 9.0));
    assert!(is_finite_buffer(&right_out));
}

#[test]
fn buffer_size_1_repeated() {
    // Many single-sample blocks must walk the grid like one long block.
    let mut kernel = busy_kernel(0.5);
    let mut ppq = 0.0;
    for i in 0..48000 {
        let transport = TransportSnapshot::playing(140.0, ppq);
        let x = [(i as f32 * 0.01).sin()];
        let (mut l, mut r) = ([0.0f32], [0.0f32]);
        kernel.process([&x, &x], [&mut l, &mut r], &transport);
        assert!(l[0].is_finite() && r[0].is_finite(), "non-finite at sample {i}");
        ppq += transport.quarter_notes(1, SAMPLE_RATE);
    }
    assert!(kernel.tracker().last_cell().is_some());
}
