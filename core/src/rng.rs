//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single session seed.
//!
//! Each subsystem gets its own RNG stream, seeded deterministically
//! from (master_seed, slot, step). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - Replaying the same inputs with the same seed reproduces a session.

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll an integer in [lo, hi], both inclusive.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        self.inner.gen_range(lo..=hi)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a slice. None when the slice is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Draw `count` distinct values from [lo, hi] without replacement,
    /// in draw order.
    pub fn sample_distinct(&mut self, lo: u32, hi: u32, count: usize) -> Vec<u32> {
        if lo > hi {
            return Vec::new();
        }
        let span = (hi - lo) as usize + 1;
        index::sample(&mut self.inner, span, count.min(span))
            .into_iter()
            .map(|i| lo + i as u32)
            .collect()
    }
}

/// All subsystem RNGs for a single session, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Stream for `slot` at a given step (tick number or command sequence).
    /// Distinct steps yield independent streams.
    pub fn for_subsystem_at(&self, slot: SubsystemSlot, step: u64) -> SubsystemRng {
        let step_seed = self
            .master_seed
            .wrapping_add(step.wrapping_mul(0xd1b5_4a32_d192_ed03));
        SubsystemRng::new(step_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Movement = 0,
    Needs = 1,
    Visitor = 2,
    Command = 3,
    // Add new subsystems here — append only.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Needs => "needs",
            Self::Visitor => "visitor",
            Self::Command => "command",
        }
    }
}
