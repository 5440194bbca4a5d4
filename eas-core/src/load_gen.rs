/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Synthetic task-arrival generator.
//!
//! Mirrors the Python original's `LoadGenerator`: two independent PRNG
//! streams seeded from the same value — one gates whether a task is emitted
//! this tick, the other draws the new task's instruction count from a
//! triangular distribution. Seeding both streams identically and letting
//! them diverge only through differing call counts is the original's
//! behavior, carried over here rather than "fixed", since changing it would
//! change which task sequences a given seed produces.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Triangular};
use rand_pcg::Pcg64;

use crate::task::{Task, TaskClass};

/// Generates a stream of randomly-sized user tasks, gated by a per-tick
/// emission probability.
pub struct LoadGenerator {
    insts_rng: Pcg64,
    task_rng: Pcg64,
    insts_peak_distrib: f64,
    max_instructions: f64,
    gen_prob: f64,
    next_id: u64,
}

impl LoadGenerator {
    /// `instructions_peak_distrib` and `max_instructions` parameterize the
    /// `Triangular(10, peak, max)` draw for a new task's total cycles.
    /// `gen_prob` is the probability, each call to [`gen`](Self::gen), that
    /// *no* task is emitted (matching the original's `>= gen_prob` gate).
    pub fn new(instructions_peak_distrib: u64, max_instructions: u64, gen_prob: f64, seed: u64) -> Self {
        Self {
            insts_rng: Pcg64::seed_from_u64(seed),
            task_rng: Pcg64::seed_from_u64(seed),
            insts_peak_distrib: instructions_peak_distrib as f64,
            max_instructions: max_instructions as f64,
            gen_prob,
            next_id: 0,
        }
    }

    /// With probability `1 - gen_prob`, emit a new [`Task`] with a
    /// triangularly-distributed instruction count and a monotonically
    /// increasing id. Otherwise, `None`.
    pub fn gen(&mut self) -> Option<Task> {
        if self.task_rng.gen::<f64>() >= self.gen_prob {
            Some(self.generate_random_task())
        } else {
            None
        }
    }

    fn generate_random_task(&mut self) -> Task {
        let dist = Triangular::new(10.0, self.max_instructions, self.insts_peak_distrib)
            .expect("peak must lie within [10, max_instructions]");
        let insts = dist.sample(&mut self.insts_rng) as u64;
        let id = self.next_id;
        self.next_id += 1;
        Task::new(insts, TaskClass::User(id))
    }
}

impl Iterator for LoadGenerator {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        self.gen()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_prob_zero_always_emits() {
        let mut gen = LoadGenerator::new(100, 1_000, 0.0, 42);
        for _ in 0..50 {
            assert!(gen.gen().is_some());
        }
    }

    #[test]
    fn gen_prob_one_never_emits() {
        let mut gen = LoadGenerator::new(100, 1_000, 1.0, 42);
        for _ in 0..50 {
            assert!(gen.gen().is_none());
        }
    }

    #[test]
    fn emitted_tasks_have_increasing_ids() {
        let mut gen = LoadGenerator::new(100, 1_000, 0.0, 7);
        let mut ids = Vec::new();
        for _ in 0..5 {
            if let Some(task) = gen.gen() {
                if let TaskClass::User(id) = task.class() {
                    ids.push(id);
                }
            }
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.windows(2).filter(|w| w[0] == w[1]).count(), 0);
    }

    #[test]
    fn generated_instruction_counts_stay_within_distribution_bounds() {
        let mut gen = LoadGenerator::new(500, 1_000, 0.0, 123);
        for _ in 0..200 {
            let task = gen.gen().unwrap();
            assert!(task.total_cycles() >= 10);
            assert!(task.total_cycles() <= 1_000);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut a = LoadGenerator::new(500, 1_000, 0.3, 99);
        let mut b = LoadGenerator::new(500, 1_000, 0.3, 99);
        for _ in 0..50 {
            let ta = a.gen().map(|t| t.total_cycles());
            let tb = b.gen().map(|t| t.total_cycles());
            assert_eq!(ta, tb);
        }
    }
}
