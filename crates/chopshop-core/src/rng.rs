//! Per-stage random number generator.
//!
//! Each stage owns one [`Rng`] and is reseeded explicitly, so two engine
//! instances in one process never share random state and a given seed always
//! reproduces the same cut pattern.
//!
//! Linear congruential generator with the Numerical Recipes constants. Only
//! the upper bits are used, since the low bits of an LCG have short periods.

/// Small deterministic LCG.
///
/// # Example
///
/// ```rust
/// use chopshop_core::Rng;
///
/// let mut a = Rng::new(7);
/// let mut b = Rng::new(7);
/// assert_eq!(a.next_u32(), b.next_u32());
///
/// let x = a.range_f64(0.25, 0.5);
/// assert!((0.25..0.5).contains(&x));
/// ```
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Create a generator from a seed.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: seed ^ 0x1234_5678,
        }
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// Next raw state.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform in `[0.0, 1.0)` with 24 bits of resolution.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32() >> 8) / 16_777_216.0
    }

    /// Uniform between `a` and `b` (in either order).
    #[inline]
    pub fn range_f64(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_f64()
    }

    /// Uniform integer in the inclusive range spanned by `a` and `b`.
    #[inline]
    pub fn range_i32(&mut self, a: i32, b: i32) -> i32 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let span = f64::from(hi - lo + 1);
        lo + ((self.next_f64() * span) as i32).min(hi - lo)
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(1)
    }
}
