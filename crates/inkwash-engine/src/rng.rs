//! Seedable randomness for the procedural brushes.

/// Small xorshift32 generator.
///
/// Every brush algorithm draws its variation from an injected `StrokeRng`
/// rather than ambient randomness, so tests can pin a seed and assert
/// structural properties (particle counts, displacement bounds) without
/// depending on exact pixels.
#[derive(Debug, Clone)]
pub struct StrokeRng {
    state: u32,
}

impl StrokeRng {
    /// Create a generator from a seed. Zero is remapped so the xorshift
    /// stream can never stick at zero.
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform float in [-1, 1).
    pub fn signed(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }

    /// Uniform float in [lo, hi). Degenerate ranges return `lo`.
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_f64() * (hi - lo)
    }

    /// Random offset in [-amount, amount).
    pub fn jitter(&mut self, amount: f64) -> f64 {
        self.signed() * amount
    }

    /// True with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Pick a slice element. Returns None on an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_u32() as usize) % items.len();
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_same_seed() {
        let mut a = StrokeRng::new(42);
        let mut b = StrokeRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_still_advances() {
        let mut rng = StrokeRng::new(0);
        let first = rng.next_u32();
        let second = rng.next_u32();
        assert_ne!(first, 0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_next_f64_in_unit_interval() {
        let mut rng = StrokeRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_range_bounds() {
        let mut rng = StrokeRng::new(9);
        for _ in 0..1000 {
            let v = rng.range(3.0, 8.0);
            assert!((3.0..8.0).contains(&v));
        }
        assert_eq!(rng.range(5.0, 5.0), 5.0);
        assert_eq!(rng.range(5.0, 1.0), 5.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = StrokeRng::new(11);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_pick() {
        let mut rng = StrokeRng::new(13);
        let items = [1, 2, 3];
        for _ in 0..50 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
        let empty: [i32; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }
}
