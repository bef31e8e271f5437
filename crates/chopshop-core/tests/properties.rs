//! Property-based tests for chopshop-core.
//!
//! Parameter round trips, step boundaries and grid monotonicity over
//! randomized tempos, meters and block sizes.

use chopshop_core::{
    GridPosition, ParamDescriptor, PositionTracker, TransportSnapshot, TransportWatcher,
    normalized_to_plain, normalized_to_steps, plain_to_normalized, steps_to_normalized,
};
use proptest::prelude::*;

const STEP_COUNTS: [u32; 5] = [1, 4, 7, 15, 31];
const SUBDIVISIONS: [u32; 7] = [6, 8, 12, 16, 18, 24, 32];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// plain -> normalized -> plain is the identity across a continuous range.
    #[test]
    fn continuous_round_trip(
        min in -5000.0f64..5000.0,
        span in 0.001f64..10000.0,
        t in 0.0f64..=1.0,
    ) {
        let max = min + span;
        let plain = min + span * t;
        let back = normalized_to_plain(min, max, plain_to_normalized(min, max, plain));
        prop_assert!((back - plain).abs() <= 1e-9 * span.max(1.0), "{} -> {}", plain, back);
    }

    /// Every normalized value maps into the declared step range.
    #[test]
    fn steps_stay_in_range(
        count_index in 0usize..5,
        start in -4i32..4,
        normalized in 0.0f64..=1.0,
    ) {
        let count = STEP_COUNTS[count_index];
        let step = normalized_to_steps(count, start, normalized);
        prop_assert!(step >= start && step <= start + count as i32);
    }

    /// steps -> normalized -> steps is the identity for every integer step.
    #[test]
    fn step_round_trip(count_index in 0usize..5, start in 0i32..2, offset in 0u32..32) {
        let count = STEP_COUNTS[count_index];
        let step = start + (offset % (count + 1)) as i32;
        let normalized = steps_to_normalized(count, start, f64::from(step));
        prop_assert_eq!(normalized_to_steps(count, start, normalized), step);
    }

    /// Parsing a formatted value lands on the same plain value.
    #[test]
    fn descriptor_text_round_trip(normalized in 0.0f64..=1.0) {
        let d = ParamDescriptor::continuous("Comb Min Delay", "comb_min_delay", 1.0, 50.0, 0.2)
            .with_precision(3);
        let text = d.format_value(normalized);
        let parsed = d.parse_value(&text).unwrap();
        prop_assert!((d.to_plain(parsed) - d.to_plain(normalized)).abs() < 1e-3);
    }

    /// While playing at a fixed tempo the running grid never decreases, and
    /// every reported cell is the successor of the previous report.
    #[test]
    fn grid_monotonic_and_reports_each_cell_once(
        tempo in 40.0f64..300.0,
        numerator in 1u32..13,
        denominator_pow in 1u32..4,
        sub_index in 0usize..7,
        block in 16usize..2048,
        start_ppq in 0.0f64..64.0,
    ) {
        let subdivision = SUBDIVISIONS[sub_index];
        let sample_rate = 48000.0;
        let mut tracker = PositionTracker::new(subdivision, sample_rate);
        let mut transport = TransportSnapshot {
            tempo,
            numerator: f64::from(numerator),
            denominator: f64::from(1u32 << denominator_pow),
            ppq_position: start_ppq,
            playing: true,
            discontinuity: false,
        };

        let mut previous_position = f64::NEG_INFINITY;
        let mut reports: Vec<GridPosition> = Vec::new();
        for _ in 0..8 {
            let mut grid = tracker.begin_block(block, &transport).unwrap();
            for _ in 0..block {
                prop_assert!(grid.position() >= previous_position);
                previous_position = grid.position();
                if let Some(pos) = tracker.advance(&mut grid) {
                    reports.push(pos);
                }
            }
            transport.ppq_position += transport.quarter_notes(block, sample_rate);
        }

        prop_assert!(!reports.is_empty());
        for pair in reports.windows(2) {
            prop_assert_eq!(pair[0].next(subdivision), pair[1]);
        }
    }

    /// Host drift inside the watcher's tolerance never repeats or skips a
    /// cell, whichever way it goes.
    #[test]
    fn grid_tolerates_host_drift(
        tempo in 60.0f64..200.0,
        sub_index in 0usize..7,
        block in 64usize..2048,
        drifts in proptest::collection::vec(-0.009f64..0.009, 16),
    ) {
        let subdivision = SUBDIVISIONS[sub_index];
        let sample_rate = 44100.0;
        let mut watcher = TransportWatcher::default();
        let mut tracker = PositionTracker::new(subdivision, sample_rate);
        let mut ppq = 1.0;

        let mut reports: Vec<GridPosition> = Vec::new();
        for (i, drift) in drifts.iter().enumerate() {
            let mut transport = TransportSnapshot::playing(tempo, ppq);
            watcher.observe(&mut transport, block, sample_rate);
            prop_assert_eq!(transport.discontinuity, i == 0);

            let mut grid = tracker.begin_block(block, &transport).unwrap();
            reports.extend(grid.seek());
            for _ in 0..block {
                reports.extend(tracker.advance(&mut grid));
            }
            ppq += transport.quarter_notes(block, sample_rate) + drift;
        }

        for pair in reports.windows(2) {
            prop_assert_eq!(pair[0].next(subdivision), pair[1]);
        }
    }
}
