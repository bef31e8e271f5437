//! Grid demo: parameter mapping, and the position tracker following a
//! transport through a seek.
//!
//! Run with: cargo run -p chopshop-core --example grid_demo

use chopshop_core::{
    ParamDescriptor, PositionTracker, TransportSnapshot, TransportWatcher, normalized_to_plain,
    normalized_to_steps,
};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 1024;

fn main() {
    println!("=== Parameter Mapping ===\n");
    println!("{:>10} {:>12} {:>8}", "normalized", "plain 0..90", "step/6");
    for i in 0..=8 {
        let n = f64::from(i) / 8.0;
        println!(
            "{n:>10.3} {:>12.2} {:>8}",
            normalized_to_plain(0.0, 90.0, n),
            normalized_to_steps(6, 0, n)
        );
    }

    let fade = ParamDescriptor::continuous("Fade", "fade", 0.0, 100.0, 0.0);
    println!("\nfade at 0.25 -> {}", fade.format_value(0.25));

    println!("\n=== Grid at 120 BPM, 8 cells per bar ===\n");
    let mut watcher = TransportWatcher::default();
    let mut tracker = PositionTracker::new(8, SAMPLE_RATE);
    let mut ppq = 0.0;

    for block in 0..12 {
        // Jump to bar 5 halfway through.
        if block == 6 {
            ppq = 16.0;
        }
        let mut transport = TransportSnapshot::playing(120.0, ppq);
        watcher.observe(&mut transport, BLOCK, SAMPLE_RATE);

        let Some(mut grid) = tracker.begin_block(BLOCK, &transport) else {
            continue;
        };
        if let Some(seek) = grid.seek() {
            println!(
                "block {block:>2}: seek to bar {} cell {}",
                seek.measure, seek.position_in_measure
            );
        }
        for _ in 0..BLOCK {
            if let Some(cell) = tracker.advance(&mut grid) {
                println!(
                    "block {block:>2}: cell bar {} cell {}",
                    cell.measure, cell.position_in_measure
                );
            }
        }
        ppq += transport.quarter_notes(BLOCK, SAMPLE_RATE);
    }
}
