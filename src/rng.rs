use rand::prelude::*;

use crate::config::TimingConfig;

/// Supplies the unlock delay for each round.
pub trait DelaySource {
    fn next_delay_ms(&mut self) -> u64;

    /// Seed the sequence was built from, if it is reproducible.
    fn seed(&self) -> Option<u64> { None }
}

/// Uniform draw from `[min, max)`.
#[derive(Clone, Debug)]
pub struct UniformDelay {
    rng: StdRng,
    seed: Option<u64>,
    min_ms: u64,
    max_ms: u64,
}

impl UniformDelay {
    pub fn seeded(cfg: &TimingConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed), Some(seed))
    }

    pub fn from_entropy(cfg: &TimingConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy(), None)
    }

    pub fn new(cfg: &TimingConfig, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(cfg, seed),
            None => Self::from_entropy(cfg),
        }
    }

    fn with_rng(cfg: &TimingConfig, rng: StdRng, seed: Option<u64>) -> Self {
        Self { rng, seed, min_ms: cfg.unlock_delay_min_ms, max_ms: cfg.unlock_delay_max_ms }
    }
}

impl DelaySource for UniformDelay {
    fn next_delay_ms(&mut self) -> u64 {
        if self.max_ms > self.min_ms { self.rng.gen_range(self.min_ms..self.max_ms) } else { self.min_ms }
    }

    fn seed(&self) -> Option<u64> { self.seed }
}

/// Cycles through a fixed list of delays. Used by tests and replays.
#[derive(Clone, Debug)]
pub struct ScriptedDelay {
    delays: Vec<u64>,
    next: usize,
}

impl ScriptedDelay {
    pub fn new(delays: impl Into<Vec<u64>>) -> Self {
        Self { delays: delays.into(), next: 0 }
    }

    pub fn constant(delay_ms: u64) -> Self { Self::new(vec![delay_ms]) }
}

impl DelaySource for ScriptedDelay {
    fn next_delay_ms(&mut self) -> u64 {
        if self.delays.is_empty() { return 0; }
        let d = self.delays[self.next % self.delays.len()];
        self.next += 1;
        d
    }
}

impl<D: DelaySource + ?Sized> DelaySource for Box<D> {
    fn next_delay_ms(&mut self) -> u64 { (**self).next_delay_ms() }
    fn seed(&self) -> Option<u64> { (**self).seed() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_delay_stays_in_bounds() {
        let cfg = TimingConfig::default();
        let mut src = UniformDelay::from_entropy(&cfg);
        for _ in 0..10_000 {
            let d = src.next_delay_ms();
            assert!((2000..5000).contains(&d), "delay {d} out of range");
        }
    }

    #[test]
    fn seeded_delays_repeat() {
        let cfg = TimingConfig::default();
        let mut a = UniformDelay::seeded(&cfg, 42);
        let mut b = UniformDelay::seeded(&cfg, 42);
        let xs: Vec<u64> = (0..16).map(|_| a.next_delay_ms()).collect();
        let ys: Vec<u64> = (0..16).map(|_| b.next_delay_ms()).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.seed(), Some(42));
    }

    #[test]
    fn scripted_delay_cycles() {
        let mut s = ScriptedDelay::new(vec![2000, 3000]);
        assert_eq!(s.next_delay_ms(), 2000);
        assert_eq!(s.next_delay_ms(), 3000);
        assert_eq!(s.next_delay_ms(), 2000);
    }
}
