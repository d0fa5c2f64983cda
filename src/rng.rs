use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Bit depth of the acceptance draw: thresholds live in `[0, 1 << RAND_DEPTH]`.
pub const RAND_DEPTH: u32 = 18;

/// Size of the acceptance-draw domain, `2^RAND_DEPTH`.
pub const RAND_DOMAIN: u32 = 1 << RAND_DEPTH;

/// Cheap generator feeding the acceptance rule: one call per site per sweep.
///
/// Quality requirements are deliberately low; only the top [`RAND_DEPTH`] bits
/// of each output are consumed (see [`acceptance_draw`]), which avoids the
/// weak low-order bits of a linear congruential state. Initial spin
/// configurations come from a strong generator instead
/// (see [`seeding_rng`]).
pub trait FastGen: Clone + Send {
    fn seed(&mut self, seed: u64);
    fn next(&mut self) -> u64;
}

/// Extract the top [`RAND_DEPTH`] bits of a fast-generator output.
#[inline]
pub fn acceptance_draw<G: FastGen>(gen: &mut G) -> u32 {
    (gen.next() >> (64 - RAND_DEPTH)) as u32
}

/// Strong generator used to seed initial spins and fast-generator state.
///
/// Reseeded with `rep + 1` at the start of every repetition, which is the
/// entire reproducibility contract: a repetition index fully determines its
/// spin trajectory.
pub fn seeding_rng(rep: usize) -> Xoshiro256StarStar {
    Xoshiro256StarStar::seed_from_u64(rep as u64 + 1)
}

/// 64-bit linear congruential generator (the default fast generator).
#[derive(Debug, Clone)]
pub struct Lincon {
    state: u64,
}

const LINCON_MULT: u64 = 6364136223846793005;
const LINCON_INC: u64 = 1442695040888963407;

impl Lincon {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl Default for Lincon {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FastGen for Lincon {
    fn seed(&mut self, seed: u64) {
        self.state = seed;
    }

    #[inline]
    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LINCON_MULT)
            .wrapping_add(LINCON_INC);
        self.state
    }
}

const LAGFIB_SHORT: usize = 418;
const LAGFIB_LONG: usize = 1279;

/// Additive lagged-Fibonacci generator with lags (418, 1279).
///
/// The buffer is filled from the strong generator at seed time, so `seed`
/// is considerably more expensive than [`Lincon::seed`]; per-draw cost is
/// comparable.
#[derive(Debug, Clone)]
pub struct LagFib {
    buf: Vec<u64>,
    p: usize,
    o: usize,
}

impl LagFib {
    pub fn new(seed: u64) -> Self {
        let mut gen = Self {
            buf: vec![0; LAGFIB_LONG],
            p: LAGFIB_SHORT,
            o: 0,
        };
        FastGen::seed(&mut gen, seed);
        gen
    }
}

impl Default for LagFib {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FastGen for LagFib {
    fn seed(&mut self, seed: u64) {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        for word in self.buf.iter_mut() {
            *word = rng.next_u64();
        }
        self.p = LAGFIB_SHORT;
        self.o = 0;
    }

    #[inline]
    fn next(&mut self) -> u64 {
        let r = self.buf[self.p].wrapping_add(self.buf[self.o]);
        self.buf[self.p] = r;
        self.p += 1;
        if self.p >= LAGFIB_LONG {
            self.p = 0;
        }
        self.o += 1;
        if self.o >= LAGFIB_LONG {
            self.o = 0;
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lincon_deterministic() {
        let mut a = Lincon::new(7);
        let mut b = Lincon::new(7);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
        b.seed(7);
        let mut a2 = Lincon::new(7);
        assert_eq!(a2.next(), b.next());
    }

    #[test]
    fn test_acceptance_draw_in_domain() {
        let mut gen = Lincon::new(123);
        for _ in 0..10_000 {
            assert!(acceptance_draw(&mut gen) < RAND_DOMAIN);
        }
    }

    #[test]
    fn test_acceptance_draw_roughly_uniform() {
        // Top-18-bit draws from the LCG should hit the lower half of the
        // domain about half the time.
        let mut gen = Lincon::new(1);
        let n = 100_000;
        let below = (0..n)
            .filter(|_| acceptance_draw(&mut gen) < RAND_DOMAIN / 2)
            .count();
        let frac = below as f64 / n as f64;
        assert!((frac - 0.5).abs() < 0.01, "frac = {frac}");
    }

    #[test]
    fn test_lagfib_deterministic_and_distinct() {
        let mut a = LagFib::new(3);
        let mut b = LagFib::new(3);
        let mut c = LagFib::new(4);
        let mut any_diff = false;
        for _ in 0..LAGFIB_LONG * 2 {
            let va = a.next();
            assert_eq!(va, b.next());
            any_diff |= va != c.next();
        }
        assert!(any_diff);
    }

    #[test]
    fn test_seeding_rng_reseed_is_idempotent() {
        let mut a = seeding_rng(5);
        let mut b = seeding_rng(5);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
