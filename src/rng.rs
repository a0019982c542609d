//! Randomness seam shared by every game.
//!
//! All chance in the crate flows through [`RandomSource`] so that game
//! outcomes are deterministically testable by substituting a scripted
//! sequence. The production source draws from the process-seeded thread
//! RNG; none of this is cryptographic and none of it needs to be.

use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Uniform randomness used by the reward scheduler and the games.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in the inclusive range `[low, high]`.
    fn int_in(&self, low: i64, high: i64) -> i64;

    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64;
}

/// Production source backed by the per-thread RNG, re-seeded per process.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn int_in(&self, low: i64, high: i64) -> i64 {
        rand::thread_rng().gen_range(low..=high)
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic source replaying scripted draws, for tests.
///
/// Integer and unit-interval draws pop from separate queues in the order
/// the code under test requests them. Panics when a queue runs dry, which
/// in a test is the right failure mode.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    ints: Mutex<VecDeque<i64>>,
    units: Mutex<VecDeque<f64>>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ints<I: IntoIterator<Item = i64>>(self, ints: I) -> Self {
        self.ints.lock().unwrap().extend(ints);
        self
    }

    pub fn with_units<I: IntoIterator<Item = f64>>(self, units: I) -> Self {
        self.units.lock().unwrap().extend(units);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn int_in(&self, low: i64, high: i64) -> i64 {
        let value = self
            .ints
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted integer draws exhausted");
        assert!(
            (low..=high).contains(&value),
            "scripted draw {} outside [{}, {}]",
            value,
            low,
            high
        );
        value
    }

    fn unit(&self) -> f64 {
        self.units
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted unit draws exhausted")
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T>(rng: &dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.int_in(0, i as i64) as usize;
        items.swap(i, j);
    }
}

/// Pick one element of a non-empty slice uniformly.
pub fn pick<'a, T>(rng: &dyn RandomSource, items: &'a [T]) -> &'a T {
    &items[rng.int_in(0, items.len() as i64 - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_respects_bounds() {
        let rng = ThreadRandom;
        for _ in 0..1000 {
            let v = rng.int_in(500, 7000);
            assert!((500..=7000).contains(&v));
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn scripted_draws_replay_in_order() {
        let rng = ScriptedRandom::new()
            .with_ints([3, 1, 4])
            .with_units([0.25, 0.75]);
        assert_eq!(rng.int_in(0, 6), 3);
        assert_eq!(rng.int_in(0, 6), 1);
        assert_eq!(rng.int_in(0, 6), 4);
        assert_eq!(rng.unit(), 0.25);
        assert_eq!(rng.unit(), 0.75);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let rng = ThreadRandom;
        let mut items: Vec<u32> = (0..52).collect();
        shuffle(&rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..52).collect::<Vec<_>>());
    }

    #[test]
    fn pick_covers_every_index() {
        let rng = ScriptedRandom::new().with_ints([0, 6]);
        let items = [10, 20, 30, 40, 50, 60, 70];
        assert_eq!(*pick(&rng, &items), 10);
        assert_eq!(*pick(&rng, &items), 70);
    }
}
