//! Integration tests for chopshop-config.
//!
//! Presets are resolved, published through a controller and picked up by the
//! processor on its next block.

use chopshop_config::{ConfigError, Preset, factory_presets, get_factory_preset};
use chopshop_core::{StereoStage, TransportSnapshot};
use chopshop_engine::{
    AudioBlock, EngineConfig, EventBuffer, ParameterId, ParameterState, Processor, create,
};

const SAMPLE_RATE: f64 = 48000.0;

fn run_block(processor: &mut Processor, ppq: f64, len: usize) -> (Vec<f32>, Vec<f32>) {
    let input: Vec<f32> = (0..len).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
    let mut out_l = vec![0.0; len];
    let mut out_r = vec![0.0; len];
    let mut sink = EventBuffer::with_capacity(16);
    processor.process(
        AudioBlock::new([&input, &input], [&mut out_l, &mut out_r]),
        Some(TransportSnapshot::playing(120.0, ppq)),
        &[],
        &mut sink,
    );
    (out_l, out_r)
}

fn assert_writable_eq(actual: &ParameterState, expected: &ParameterState, context: &str) {
    for (id, value) in expected.iter() {
        if id.is_read_only() {
            continue;
        }
        assert_eq!(actual.get(id), value, "{context}: {id:?}");
    }
}

/// Every factory preset reaches the processor intact and produces finite audio.
#[test]
fn test_factory_presets_reach_processor() {
    for preset in factory_presets() {
        let state = preset
            .to_state()
            .unwrap_or_else(|e| panic!("preset '{}' should resolve: {e}", preset.name));

        let (controller, mut processor, _reports) = create(&EngineConfig::default());
        processor.setup(SAMPLE_RATE);
        controller.publish(state);

        let mut ppq = 0.0;
        for _ in 0..32 {
            let (left, right) = run_block(&mut processor, ppq, 512);
            assert!(
                left.iter().chain(&right).all(|s| s.is_finite()),
                "preset '{}' produced non-finite output",
                preset.name
            );
            ppq += 512.0 / SAMPLE_RATE * 2.0;
        }
        assert_writable_eq(processor.state(), &state, &preset.name);
    }
}

/// The crushed comb preset switches both optional stages on.
#[test]
fn test_crushed_comb_enables_stages() {
    let preset = get_factory_preset("crushed_comb").expect("crushed_comb preset should exist");
    let (controller, mut processor, _reports) = create(&EngineConfig::default());
    processor.setup(SAMPLE_RATE);

    run_block(&mut processor, 0.0, 256);
    assert!(!processor.kernel().chain().crusher().is_enabled());
    assert!(!processor.kernel().chain().comb().is_enabled());

    controller.publish(preset.to_state().unwrap());
    run_block(&mut processor, 0.0, 256);
    assert!(processor.kernel().chain().crusher().is_enabled());
    assert!(processor.kernel().chain().comb().is_enabled());
}

/// A preset captured from a running controller survives TOML and reproduces
/// the same engine state.
#[test]
fn test_captured_preset_roundtrip() {
    let (controller, _processor, _reports) = create(&EngineConfig::default());
    let edited = Preset::new("Edit")
        .with_value("cut_proc", "SQPusher")
        .with_value("subdiv", "24")
        .with_value("sq_activity", 40.0)
        .with_value("min_pitch", -600.0)
        .with_value("comb_max_delay", "7.5 ms");
    controller.publish(edited.to_state().unwrap());

    let captured = Preset::from_state("Captured", &controller.state());
    let text = captured.to_toml().expect("should serialize");
    let restored = Preset::from_toml(&text).expect("should parse");
    assert_eq!(restored.name, "Captured");

    let state = restored.to_state().unwrap();
    for (id, value) in controller.state().iter() {
        if id.is_read_only() {
            continue;
        }
        let desc = id.descriptor();
        assert!(
            (desc.to_native(state.get(id)) - desc.to_native(value)).abs() < 1e-9,
            "{id:?}"
        );
    }
    assert_eq!(state.native(ParameterId::CutProc), 2.0);
    assert_eq!(state.native(ParameterId::SubDiv), 24.0);
}

/// Invalid presets never reach the engine.
#[test]
fn test_rejected_preset_leaves_engine_untouched() {
    let (controller, mut processor, _reports) = create(&EngineConfig::default());
    processor.setup(SAMPLE_RATE);

    let bad = Preset::new("Bad")
        .with_value("cut_proc", "WarpCut")
        .with_value("fill_duty", 150.0);
    let mut state = controller.state();
    let err = bad.apply_to(&mut state).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref param, .. } if param == "fill_duty"));
    assert_eq!(state, controller.state());

    assert!(!controller.is_pending());
    run_block(&mut processor, 0.0, 128);
    assert_eq!(processor.state().native(ParameterId::CutProc), 0.0);
}

/// Applying a preset on top of an edited state only touches listed values.
#[test]
fn test_apply_preserves_unlisted_values() {
    let mut state = ParameterState::default();
    state.set(ParameterId::Comb, 1.0);
    state.set(ParameterId::Duty, 0.8);

    Preset::new("Partial")
        .with_value("cut_proc", "WarpCut")
        .apply_to(&mut state)
        .unwrap();

    assert_eq!(state.native(ParameterId::CutProc), 1.0);
    assert_eq!(state.get(ParameterId::Comb), 1.0);
    assert_eq!(state.get(ParameterId::Duty), 0.8);
}
