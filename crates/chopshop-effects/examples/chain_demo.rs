//! Effect chain demo: run each cut procedure over a few bars of a sine and
//! print how many blocks and cuts it started, and the output level.
//!
//! Run with: cargo run -p chopshop-effects --example chain_demo

use chopshop_core::{GridPosition, StereoStage, TransportSnapshot};
use chopshop_effects::{CutProc, EffectChain};

const SAMPLE_RATE: f64 = 48000.0;
const BARS: usize = 4;

fn main() {
    let transport = TransportSnapshot::playing(128.0, 0.0);

    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8}",
        "Procedure", "Crusher", "Blocks", "Cuts", "Peak"
    );
    println!("{:-<10} {:->8} {:->8} {:->8} {:->8}", "", "", "", "", "");

    for proc in [CutProc::CutProc11, CutProc::WarpCut, CutProc::SqPusher] {
        for crushed in [false, true] {
            let mut chain = EffectChain::new(SAMPLE_RATE);
            chain.reseed(7);
            chain.cut_mut().set_cut_proc(proc);
            chain.cut_mut().set_subdivision(16);
            chain.crusher_mut().set_enabled(crushed);
            chain.crusher_mut().set_bit_range(4, 8);
            chain.set_time_info(&transport);

            let subdivision = chain.cut().subdivision();
            let per_cell = chain.cut().samples_per_cell() as usize;
            let cells = BARS * subdivision as usize;

            let mut pos = GridPosition::new(0, 0);
            let mut peak = 0.0f32;
            for n in 0..cells * per_cell {
                if n % per_cell == 0 {
                    chain.set_position(pos);
                    pos = pos.next(subdivision);
                }
                let t = n as f32 / SAMPLE_RATE as f32;
                let x = (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.5;
                let (l, r) = chain.process_stereo(x, x);
                peak = peak.max(l.abs()).max(r.abs());
            }

            let blocks = chain.cut_mut().take_block_count();
            let cuts = chain.cut_mut().take_cut_count();
            println!(
                "{:<10} {:>8} {:>8} {:>8} {:>8.3}",
                format!("{proc:?}"),
                if crushed { "on" } else { "off" },
                blocks,
                cuts,
                peak
            );
        }
    }
}
