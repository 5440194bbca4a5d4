/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task representation for the EAS simulator.
//!
//! A [`Task`] is the simulator's unit of work: a budget of cycles to
//! execute, counted down by [`Cpu::execute_for`](crate::cpu::Cpu::execute_for)
//! each scheduler tick. Two flavors of task circulate through the
//! simulator:
//!
//! * **User tasks** — produced by [`LoadGenerator`](crate::load_gen::LoadGenerator),
//!   carrying a unique monotonically increasing integer identity.
//! * **Kernel/overhead tasks** — synthesised by the scheduler itself to
//!   charge the cost of its own decisions (`"energy"`, `"balance"`) or to
//!   represent the absence of work (`"idle"`). These never count as user
//!   task terminations even when they run to completion.
//!
//! # Ownership
//! Tasks are owned by whichever [`RunQueue`](crate::runqueue::RunQueue)
//! currently holds them, or transiently by the scheduler while it decides
//! where to place a freshly generated one.

use std::fmt;

// ── Task class ────────────────────────────────────────────────────────────────

/// What kind of work a [`Task`] represents.
///
/// Mirrors the symbolic `name` field of the Python original (`"idle"`,
/// `"energy"`, `"balance"`, or an integer uuid for user tasks), but typed so
/// the scheduler can never mistake a kernel task for user work by string
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
    /// A task generated by the [`LoadGenerator`](crate::load_gen::LoadGenerator),
    /// identified by its unique monotonically increasing id.
    User(u64),
    /// The singleton idle task executed when a run-queue has nothing else to
    /// offer.
    Idle,
    /// Overhead charged for a wake-up balancer decision.
    Energy,
    /// Overhead charged for a load-balancer or over-utilization decision.
    Balance,
}

impl TaskClass {
    /// `true` for the synthetic kernel classes (`Idle`, `Energy`, `Balance`);
    /// `false` for `User`. Kernel tasks never count as user terminations.
    pub fn is_kernel(self) -> bool {
        !matches!(self, TaskClass::User(_))
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskClass::User(id) => write!(f, "{id}"),
            TaskClass::Idle => write!(f, "idle"),
            TaskClass::Energy => write!(f, "energy"),
            TaskClass::Balance => write!(f, "balance"),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A unit of work measured in cycles.
///
/// Invariant: `remaining_cycles` is monotonically non-increasing and always
/// stays within `[0, total_cycles]`; `terminated` is exactly
/// `remaining_cycles == 0`.
#[derive(Debug, Clone)]
pub struct Task {
    class: TaskClass,
    total_cycles: u64,
    remaining_cycles: u64,
}

impl Task {
    /// Create a new task with `total_cycles` of work, identified by `class`.
    pub fn new(total_cycles: u64, class: TaskClass) -> Self {
        Self {
            class,
            total_cycles,
            remaining_cycles: total_cycles,
        }
    }

    /// The never-terminating idle task executed when a CPU's run-queue is
    /// empty. `total_cycles` is `u64::MAX` so it never reports `terminated`.
    pub fn idle() -> Self {
        Self::new(u64::MAX, TaskClass::Idle)
    }

    pub fn class(&self) -> TaskClass {
        self.class
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    pub fn remaining_cycles(&self) -> u64 {
        self.remaining_cycles
    }

    /// `total_cycles - remaining_cycles`, used as the run-queue's ordering
    /// key (virtual runtime).
    pub fn executed_cycles(&self) -> u64 {
        self.total_cycles - self.remaining_cycles
    }

    pub fn terminated(&self) -> bool {
        self.remaining_cycles == 0
    }

    /// Decrease `remaining_cycles` by `min(cycles, remaining_cycles)`.
    ///
    /// If `cycles` exceeds what remains, the task simply terminates — the
    /// surplus is the caller's concern (the CPU reports it as slack/idle
    /// cycles, see [`Cpu::execute_for`](crate::cpu::Cpu::execute_for)). This
    /// never fails: there is no invalid `cycles` value.
    pub fn execute(&mut self, cycles: u64) {
        self.remaining_cycles = self.remaining_cycles.saturating_sub(cycles);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_decreases_remaining_and_terminates_at_zero() {
        let mut t = Task::new(100, TaskClass::User(0));
        t.execute(40);
        assert_eq!(t.remaining_cycles(), 60);
        assert_eq!(t.executed_cycles(), 40);
        assert!(!t.terminated());

        t.execute(60);
        assert_eq!(t.remaining_cycles(), 0);
        assert!(t.terminated());
    }

    #[test]
    fn execute_past_remaining_does_not_panic_or_go_negative() {
        let mut t = Task::new(10, TaskClass::User(1));
        t.execute(1_000);
        assert_eq!(t.remaining_cycles(), 0);
        assert!(t.terminated());
    }

    #[test]
    fn remaining_cycles_is_monotonically_non_increasing() {
        let mut t = Task::new(50, TaskClass::Energy);
        let mut last = t.remaining_cycles();
        for _ in 0..10 {
            t.execute(3);
            let now = t.remaining_cycles();
            assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn idle_task_never_terminates_under_normal_tick_loads() {
        let mut idle = Task::idle();
        for _ in 0..1_000_000 {
            idle.execute(1_000_000);
        }
        assert!(!idle.terminated());
        assert_eq!(idle.class(), TaskClass::Idle);
    }

    #[test]
    fn task_class_is_kernel_distinguishes_user_from_synthetic() {
        assert!(!TaskClass::User(7).is_kernel());
        assert!(TaskClass::Idle.is_kernel());
        assert!(TaskClass::Energy.is_kernel());
        assert!(TaskClass::Balance.is_kernel());
    }

    #[test]
    fn task_class_display_matches_python_name_strings() {
        assert_eq!(TaskClass::Idle.to_string(), "idle");
        assert_eq!(TaskClass::Energy.to_string(), "energy");
        assert_eq!(TaskClass::Balance.to_string(), "balance");
        assert_eq!(TaskClass::User(42).to_string(), "42");
    }
}
