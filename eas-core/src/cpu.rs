/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CPU and performance-domain model.
//!
//! A [`Cpu`] is a logical core: a sorted table of [`PState`]s (capacity,
//! power pairs), a performance-domain tag grouping CPUs that share a
//! frequency table, and a contract — [`Cpu::execute_for`] — for consuming
//! cycles from whatever task the scheduler hands it this tick.

use crate::profiler::{CycleClass, Profiler};
use crate::task::{Task, TaskClass};

// ── Performance domain & P-state ──────────────────────────────────────────────

/// Opaque, equality-comparable tag grouping CPUs that share a frequency
/// table. The governor sets frequency at CPU granularity in this model;
/// domains exist only for placement grouping (wake-up balancer, energy
/// model).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PerfDom(pub String);

impl PerfDom {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for PerfDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A discrete operating point: `capacity` in instructions/sec, `power` in
/// arbitrary but consistent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PState {
    pub capacity: u64,
    pub power: u64,
}

impl PState {
    pub fn new(capacity: u64, power: u64) -> Self {
        Self { capacity, power }
    }
}

// ── Cpu ───────────────────────────────────────────────────────────────────────

/// A logical core.
///
/// Invariant: the current P-state is always a member of `pstates`, which is
/// kept sorted ascending by capacity.
#[derive(Debug, Clone)]
pub struct Cpu {
    name: String,
    perf_domain: PerfDom,
    pstates: Vec<PState>,
    current: usize,
}

impl Cpu {
    /// Build a CPU from an ascending-sorted `pstates` table. Starts at the
    /// lowest P-state (index 0), matching "reset between repetitions: P-state
    /// → lowest" (§3).
    ///
    /// `pstates` must be non-empty and already sorted ascending by capacity;
    /// this is a construction-time contract of the simulator's CPU
    /// templates, not something recovered from untrusted input, so it is
    /// asserted rather than returned as an error (§7 treats this class of
    /// condition as a fatal invariant, not a runtime failure).
    pub fn new(name: impl Into<String>, perf_domain: PerfDom, pstates: Vec<PState>) -> Self {
        assert!(!pstates.is_empty(), "CPU must have at least one P-state");
        debug_assert!(
            pstates.windows(2).all(|w| w[0].capacity <= w[1].capacity),
            "pstates must be sorted ascending by capacity"
        );
        Self {
            name: name.into(),
            perf_domain,
            pstates,
            current: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn perf_domain(&self) -> &PerfDom {
        &self.perf_domain
    }

    pub fn pstates(&self) -> &[PState] {
        &self.pstates
    }

    pub fn pstate(&self) -> PState {
        self.pstates[self.current]
    }

    pub fn max_capacity(&self) -> u64 {
        self.pstates.last().expect("non-empty pstates").capacity
    }

    /// Reset to the lowest P-state, without touching the profiler. Used
    /// between experiment repetitions; the profiler itself is replaced
    /// wholesale per repetition so there is nothing to flush here.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Set the current P-state to `ps`, which must be a member of
    /// [`pstates`](Self::pstates). Records the power transition with the
    /// profiler before switching.
    ///
    /// # Panics
    /// Panics if `ps` is not in this CPU's P-state table — asking the
    /// governor to apply a foreign P-state is a fatal construction-time
    /// invariant violation (§7), never a condition a caller can recover
    /// from sensibly.
    pub fn set_pstate(&mut self, ps: PState, profiler: &mut Profiler, now_ms: u64) {
        let idx = self
            .pstates
            .iter()
            .position(|&p| p == ps)
            .unwrap_or_else(|| panic!("P-state {ps:?} is not in CPU '{}' table", self.name));
        profiler.on_power_change(&self.name, ps.power as f64, now_ms);
        self.current = idx;
    }

    /// Execute `task` for `time_ms` simulated milliseconds at the current
    /// P-state, charging cycles to `profiler`.
    ///
    /// `cycles = ceil(capacity × time_ms / 1000)`. If `task` has fewer
    /// remaining cycles than that, the surplus is charged as slack —
    /// [`CycleClass::Slack`] — rather than failing; this is a normal
    /// mid-tick task completion, not an error (§7).
    pub fn execute_for(&self, task: &mut Task, time_ms: u64, profiler: &mut Profiler) {
        let capacity = self.pstate().capacity;
        let cycles = ceil_div(capacity * time_ms, 1000);

        let remaining_before = task.remaining_cycles();
        task.execute(cycles);

        let charged = cycles.min(remaining_before);
        let surplus = cycles.saturating_sub(remaining_before);

        profiler.on_executed(class_bucket(task.class()), charged);
        if surplus > 0 {
            profiler.on_executed(CycleClass::Slack, surplus);
        }
    }
}

fn class_bucket(class: TaskClass) -> CycleClass {
    match class {
        TaskClass::User(_) => CycleClass::User,
        TaskClass::Idle => CycleClass::Idle,
        TaskClass::Energy => CycleClass::Energy,
        TaskClass::Balance => CycleClass::Balance,
    }
}

fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator - 1) / denominator
}

// ── Tests ─────────────────────────────────────────────────────────────────────
