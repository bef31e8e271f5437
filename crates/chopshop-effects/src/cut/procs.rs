//! Cut procedures: how a phrase is divided into blocks and each block into
//! cuts.
//!
//! A procedure is asked for the next block whenever the previous one is used
//! up. It answers with a [`BlockPlan`]: how many grid cells the block spans,
//! how many cuts repeat the block's opening material, and how the cut lengths
//! grow or shrink.
//!
//! | Procedure | Character |
//! |-----------|-----------|
//! | [`CutProc::CutProc11`] | Straight repeats of 1-3 cells, stutter fills near the phrase end |
//! | [`CutProc::WarpCut`] | Accelerating or slowing rolls |
//! | [`CutProc::SqPusher`] | Sparse fast fills between longer straight blocks |

use chopshop_core::Rng;
use libm::ceil;

/// Cut procedure selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutProc {
    /// Repeats with stutter fills near the end of each phrase.
    #[default]
    CutProc11,
    /// Geometric rolls (accelerando / ritardando).
    WarpCut,
    /// Activity-driven fast fills.
    SqPusher,
}

impl CutProc {
    /// Selection by index (0, 1, 2). Out-of-range indices clamp.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::CutProc11,
            1 => Self::WarpCut,
            _ => Self::SqPusher,
        }
    }
}

/// One block of cuts, in grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPlan {
    /// Cells spanned (at least one, never more than the phrase has left).
    pub cells: u32,
    /// Number of cuts (repeats) in the block.
    pub cuts: u32,
    /// Length ratio between successive cuts; 1.0 means even cuts.
    pub ratio: f64,
    /// Fills use the fill duty cycle.
    pub fill: bool,
}

impl BlockPlan {
    const fn straight(cells: u32, cuts: u32) -> Self {
        Self {
            cells,
            cuts,
            ratio: 1.0,
            fill: false,
        }
    }
}

/// Settings of the CutProc11 procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutProc11Settings {
    /// Minimum extra repeats of a cut.
    pub min_repeat: i32,
    /// Maximum extra repeats of a cut.
    pub max_repeat: i32,
    /// Probability of a stutter fill inside the stutter area.
    pub stutter_chance: f64,
    /// Fraction of the phrase (at its end) where stutters may occur.
    pub stutter_area: f64,
}

/// Settings of the WarpCut procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpCutSettings {
    /// Probability of a plain single-cut block.
    pub straight_chance: f64,
    /// Probability that a roll has even cuts.
    pub regular_chance: f64,
    /// Probability that an uneven roll slows down instead of speeding up.
    pub ritard_chance: f64,
    /// Length ratio between successive cuts of an accelerating roll.
    pub speed: f64,
}

/// Settings of the SQPusher procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqPusherSettings {
    /// Probability of a fill block.
    pub activity: f64,
}

/// Everything the cut stage draws its randomness from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutSettings {
    /// Fade in/out length per cut, in milliseconds.
    pub fade_ms: f64,
    /// Cut amplitude bounds (linear gain).
    pub min_amp: f64,
    /// See `min_amp`.
    pub max_amp: f64,
    /// Cut pan bounds in \[-1, 1\].
    pub min_pan: f64,
    /// See `min_pan`.
    pub max_pan: f64,
    /// Block detune bounds in cents.
    pub min_pitch_cents: f64,
    /// See `min_pitch_cents`.
    pub max_pitch_cents: f64,
    /// Audible fraction of each regular cut.
    pub duty: f64,
    /// Audible fraction of each fill cut.
    pub fill_duty: f64,
    /// Phrase length bounds in bars.
    pub min_phrase_bars: i32,
    /// See `min_phrase_bars`.
    pub max_phrase_bars: i32,
    /// CutProc11 settings.
    pub cut_proc11: CutProc11Settings,
    /// WarpCut settings.
    pub warp_cut: WarpCutSettings,
    /// SQPusher settings.
    pub sq_pusher: SqPusherSettings,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            fade_ms: 0.0,
            min_amp: 1.0,
            max_amp: 1.0,
            min_pan: -0.2,
            max_pan: 0.2,
            min_pitch_cents: 0.0,
            max_pitch_cents: 0.0,
            duty: 1.0,
            fill_duty: 1.0,
            min_phrase_bars: 5,
            max_phrase_bars: 5,
            cut_proc11: CutProc11Settings {
                min_repeat: 0,
                max_repeat: 1,
                stutter_chance: 0.8,
                stutter_area: 0.5,
            },
            warp_cut: WarpCutSettings {
                straight_chance: 0.3,
                regular_chance: 0.5,
                ritard_chance: 0.5,
                speed: 0.9491,
            },
            sq_pusher: SqPusherSettings { activity: 0.5 },
        }
    }
}

const FILL_CUTS: [u32; 3] = [1, 2, 4];

impl CutProc {
    /// Plan the next block.
    ///
    /// `remaining` is the number of cells left in the phrase (at least one),
    /// `phrase_cells` the phrase length.
    pub fn plan_block(
        self,
        remaining: u32,
        phrase_cells: u32,
        settings: &CutSettings,
        rng: &mut Rng,
    ) -> BlockPlan {
        let remaining = remaining.max(1);
        let plan = match self {
            Self::CutProc11 => cut_proc11(remaining, phrase_cells, &settings.cut_proc11, rng),
            Self::WarpCut => warp_cut(remaining, &settings.warp_cut, rng),
            Self::SqPusher => sq_pusher(remaining, &settings.sq_pusher, rng),
        };
        BlockPlan {
            cells: plan.cells.clamp(1, remaining),
            cuts: plan.cuts.max(1),
            ..plan
        }
    }
}

fn cut_proc11(remaining: u32, phrase_cells: u32, s: &CutProc11Settings, rng: &mut Rng) -> BlockPlan {
    let stutter_zone = ceil(s.stutter_area.clamp(0.0, 1.0) * f64::from(phrase_cells)) as u32;
    if remaining <= stutter_zone && rng.chance(s.stutter_chance) {
        let cuts = if rng.chance(0.5) { 2 } else { 4 };
        return BlockPlan {
            fill: true,
            ..BlockPlan::straight(1, cuts)
        };
    }

    let cut_cells = (rng.range_i32(1, 3) as u32).min(remaining);
    let mut repeats = rng.range_i32(s.min_repeat.max(0), s.max_repeat.max(0)) as u32 + 1;
    while repeats > 1 && cut_cells * repeats > remaining {
        repeats -= 1;
    }
    BlockPlan::straight(cut_cells * repeats, repeats)
}

fn warp_cut(remaining: u32, s: &WarpCutSettings, rng: &mut Rng) -> BlockPlan {
    let cells = rng.range_i32(1, remaining.min(4) as i32) as u32;
    if rng.chance(s.straight_chance) {
        return BlockPlan::straight(cells, 1);
    }

    let cuts = rng.range_i32(2, 8) as u32;
    let speed = s.speed.clamp(0.1, 1.0);
    let ratio = if rng.chance(s.regular_chance) {
        1.0
    } else if rng.chance(s.ritard_chance) {
        1.0 / speed
    } else {
        speed
    };
    BlockPlan {
        cells,
        cuts,
        ratio,
        fill: true,
    }
}

fn sq_pusher(remaining: u32, s: &SqPusherSettings, rng: &mut Rng) -> BlockPlan {
    if rng.chance(s.activity) {
        let cuts = FILL_CUTS[rng.range_i32(0, 2) as usize];
        return BlockPlan {
            fill: true,
            ..BlockPlan::straight(1, cuts)
        };
    }
    let cells = (2 * rng.range_i32(1, 2) as u32).min(remaining);
    BlockPlan::straight(cells, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROCS: [CutProc; 3] = [CutProc::CutProc11, CutProc::WarpCut, CutProc::SqPusher];

    #[test]
    fn test_from_index() {
        assert_eq!(CutProc::from_index(0), CutProc::CutProc11);
        assert_eq!(CutProc::from_index(1), CutProc::WarpCut);
        assert_eq!(CutProc::from_index(2), CutProc::SqPusher);
        assert_eq!(CutProc::from_index(-3), CutProc::CutProc11);
        assert_eq!(CutProc::from_index(9), CutProc::SqPusher);
    }

    #[test]
    fn test_plans_fit_phrase() {
        let settings = CutSettings::default();
        let mut rng = Rng::new(17);
        for proc in PROCS {
            for remaining in 1..=40 {
                for _ in 0..20 {
                    let plan = proc.plan_block(remaining, 40, &settings, &mut rng);
                    assert!(plan.cells >= 1 && plan.cells <= remaining, "{proc:?} {plan:?}");
                    assert!(plan.cuts >= 1);
                    assert!(plan.ratio > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_cut_proc11_no_stutter_outside_area() {
        let mut settings = CutSettings::default();
        settings.cut_proc11.stutter_chance = 1.0;
        settings.cut_proc11.stutter_area = 0.25;
        let mut rng = Rng::new(3);
        // 40-cell phrase: stutters only in the last 10 cells.
        for _ in 0..50 {
            assert!(!CutProc::CutProc11.plan_block(30, 40, &settings, &mut rng).fill);
            assert!(CutProc::CutProc11.plan_block(10, 40, &settings, &mut rng).fill);
        }
    }

    #[test]
    fn test_cut_proc11_repeat_bounds() {
        let mut settings = CutSettings::default();
        settings.cut_proc11.stutter_chance = 0.0;
        settings.cut_proc11.min_repeat = 2;
        settings.cut_proc11.max_repeat = 2;
        let mut rng = Rng::new(8);
        for _ in 0..50 {
            let plan = CutProc::CutProc11.plan_block(64, 64, &settings, &mut rng);
            assert_eq!(plan.cuts, 3);
            assert_eq!(plan.cells % 3, 0);
        }
    }

    #[test]
    fn test_warp_cut_always_straight() {
        let mut settings = CutSettings::default();
        settings.warp_cut.straight_chance = 1.0;
        let mut rng = Rng::new(5);
        for _ in 0..50 {
            let plan = CutProc::WarpCut.plan_block(16, 16, &settings, &mut rng);
            assert_eq!(plan.cuts, 1);
            assert!(!plan.fill);
        }
    }

    #[test]
    fn test_warp_cut_accelerates() {
        let mut settings = CutSettings::default();
        settings.warp_cut.straight_chance = 0.0;
        settings.warp_cut.regular_chance = 0.0;
        settings.warp_cut.ritard_chance = 0.0;
        settings.warp_cut.speed = 0.8;
        let mut rng = Rng::new(5);
        let plan = CutProc::WarpCut.plan_block(16, 16, &settings, &mut rng);
        assert_eq!(plan.ratio, 0.8);
        assert!(plan.cuts >= 2);

        settings.warp_cut.ritard_chance = 1.0;
        let plan = CutProc::WarpCut.plan_block(16, 16, &settings, &mut rng);
        assert!((plan.ratio - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_sq_pusher_activity() {
        let mut settings = CutSettings::default();
        settings.sq_pusher.activity = 0.0;
        let mut rng = Rng::new(2);
        for _ in 0..50 {
            let plan = CutProc::SqPusher.plan_block(16, 16, &settings, &mut rng);
            assert!(!plan.fill);
            assert!(plan.cells == 2 || plan.cells == 4);
        }
        settings.sq_pusher.activity = 1.0;
        let plan = CutProc::SqPusher.plan_block(16, 16, &settings, &mut rng);
        assert!(plan.fill);
        assert_eq!(plan.cells, 1);
    }
}
