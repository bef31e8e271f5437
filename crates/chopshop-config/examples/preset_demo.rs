//! Preset demo: factory presets, validation, and capture from engine state.
//!
//! Run with: cargo run -p chopshop-config --example preset_demo

use chopshop_config::{
    Preset, PresetValue, factory_preset_names, get_factory_preset, preset_errors, resolve_value,
};
use chopshop_engine::{EngineConfig, ParameterId, create};

fn main() {
    println!("=== Factory Presets ===\n");
    for name in factory_preset_names() {
        if let Some(preset) = get_factory_preset(name) {
            println!(
                "{:<14} {:<14} {} values  {}",
                name,
                preset.name,
                preset.len(),
                preset.description.as_deref().unwrap_or("")
            );
        }
    }

    println!("\n=== Value Resolution ===\n");
    let samples = [
        ("cut_proc", PresetValue::from("WarpCut")),
        ("subdiv", PresetValue::from(16.0)),
        ("fade", PresetValue::from("12 ms")),
        ("comb_feedback", PresetValue::from(45.0)),
        ("min_pitch", PresetValue::from(-1200.0)),
        ("seed", PresetValue::from(42.0)),
    ];
    println!("{:<16} {:<10} {:>10}", "Parameter", "Value", "Normalized");
    println!("{:-<16} {:-<10} {:->10}", "", "", "");
    for (id, value) in &samples {
        match resolve_value(id, value) {
            Ok(n) => println!("{id:<16} {:<10} {n:>10.4}", value.to_string()),
            Err(e) => println!("{id:<16} {:<10} {e}", value.to_string()),
        }
    }

    println!("\n=== Validation ===\n");
    let broken = Preset::new("Broken")
        .with_value("comb_type", "Sideways")
        .with_value("duty", 250.0)
        .with_value("wobble", 1.0);
    for err in preset_errors(&broken) {
        println!("  {err}");
    }

    println!("\n=== Capture ===\n");
    let (controller, _processor, _reports) = create(&EngineConfig::default());
    if let Some(stutter) = get_factory_preset("stutter")
        && let Ok(state) = stutter.to_state()
    {
        controller.publish(state);
    }
    controller.set_value(ParameterId::Comb.index(), 1.0);

    let captured = Preset::from_state("Stutter + Comb", &controller.state())
        .with_description("Captured from a running controller");
    match captured.to_toml() {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to serialize preset: {e}"),
    }
}
