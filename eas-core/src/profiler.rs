/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Accumulates energy, cycle distribution, and placement statistics for one
//! simulation run.
//!
//! [`Profiler`] is an owned collaborator handed to the scheduler at
//! construction — unlike the Python original's class-level state, there is
//! no process-wide singleton here, so two simulations (even running on
//! separate threads of the same process) never interfere.

use std::collections::HashMap;

// ── Cycle histogram classes ───────────────────────────────────────────────────

/// The five buckets of the cycle histogram.
///
/// The spec's design notes (§9) observe that some source variants fold
/// `Slack` into `Idle`; we keep them distinct and let callers collapse the
/// two as needed (see [`Profiler::cycles_hist`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleClass {
    User,
    Energy,
    Balance,
    Idle,
    Slack,
}

const CYCLE_CLASS_COUNT: usize = 5;

fn cycle_class_index(class: CycleClass) -> usize {
    match class {
        CycleClass::User => 0,
        CycleClass::Energy => 1,
        CycleClass::Balance => 2,
        CycleClass::Idle => 3,
        CycleClass::Slack => 4,
    }
}

/// Which branch of the wake-up balancer placed a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    EnergyAware,
    LoadBalancing,
}

// ── Profiler ──────────────────────────────────────────────────────────────────

/// Per-simulation statistics collector.
#[derive(Debug, Default)]
pub struct Profiler {
    total_energy: f64,
    cpu_power_timestamp: HashMap<String, (f64, u64)>,
    cycles_hist: [u64; CYCLE_CLASS_COUNT],
    created_task: u64,
    ended_task: u64,
    placed_energy_aware: u64,
    placed_load_balancing: u64,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flush the previous `(power, timestamp)` for `cpu_name` into
    /// `total_energy` as `power × elapsed_ms`, then store the new reading.
    ///
    /// Called whenever a CPU's P-state changes. The caller is responsible
    /// for scaling `total_energy` to whatever unit (e.g. Joules) its power
    /// figures are calibrated in.
    pub fn on_power_change(&mut self, cpu_name: &str, new_power: f64, now_ms: u64) {
        if let Some(&(prev_power, prev_ts)) = self.cpu_power_timestamp.get(cpu_name) {
            self.total_energy += prev_power * (now_ms.saturating_sub(prev_ts)) as f64;
        }
        self.cpu_power_timestamp
            .insert(cpu_name.to_string(), (new_power, now_ms));
    }

    /// Flush every tracked CPU's current power forward to `now_ms`. Intended
    /// for use at simulation teardown so the final P-state's dwell time is
    /// counted.
    pub fn flush(&mut self, now_ms: u64) {
        let keys: Vec<String> = self.cpu_power_timestamp.keys().cloned().collect();
        for cpu_name in keys {
            let (power, _) = self.cpu_power_timestamp[&cpu_name];
            self.on_power_change(&cpu_name, power, now_ms);
        }
    }

    pub fn on_executed(&mut self, class: CycleClass, cycles: u64) {
        self.cycles_hist[cycle_class_index(class)] += cycles;
    }

    pub fn on_new_task(&mut self) {
        self.created_task += 1;
    }

    pub fn on_task_end(&mut self) {
        self.ended_task += 1;
    }

    pub fn on_placement(&mut self, kind: PlacementKind) {
        match kind {
            PlacementKind::EnergyAware => self.placed_energy_aware += 1,
            PlacementKind::LoadBalancing => self.placed_load_balancing += 1,
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    pub fn created_task(&self) -> u64 {
        self.created_task
    }

    pub fn ended_task(&self) -> u64 {
        self.ended_task
    }

    pub fn placed_energy_aware(&self) -> u64 {
        self.placed_energy_aware
    }

    pub fn placed_load_balancing(&self) -> u64 {
        self.placed_load_balancing
    }

    /// Raw cycle counters, in the fixed order `[user, energy, balance, idle,
    /// slack]`.
    pub fn cycles_hist(&self) -> [u64; CYCLE_CLASS_COUNT] {
        self.cycles_hist
    }

    /// Cycle counters with `slack` folded into `idle`, matching the
    /// four-bucket histogram (`[user, energy, balance, idle]`) that the
    /// CSV output (§6) and some source variants expect.
    pub fn cycles_hist_folded(&self) -> [u64; 4] {
        let h = self.cycles_hist;
        [h[0], h[1], h[2], h[3] + h[4]]
    }

    /// Percentage repartition of the four-bucket folded histogram.
    /// Returns all zeros if no cycles have been charged yet.
    pub fn cycles_repartition(&self) -> [f64; 4] {
        let h = self.cycles_hist_folded();
        let total: u64 = h.iter().sum();
        if total == 0 {
            return [0.0; 4];
        }
        let total = total as f64;
        [
            h[0] as f64 / total * 100.0,
            h[1] as f64 / total * 100.0,
            h[2] as f64 / total * 100.0,
            h[3] as f64 / total * 100.0,
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_power_change_accumulates_elapsed_energy() {
        let mut p = Profiler::new();
        p.on_power_change("cpu0", 50.0, 0);
        p.on_power_change("cpu0", 80.0, 100); // 50 * 100 = 5000 flushed
        assert_eq!(p.total_energy(), 5_000.0);

        p.flush(150); // 80 * 50 = 4000 more
        assert_eq!(p.total_energy(), 9_000.0);
    }

    #[test]
    fn independent_cpus_accumulate_independently() {
        let mut p = Profiler::new();
        p.on_power_change("cpu0", 10.0, 0);
        p.on_power_change("cpu1", 20.0, 0);
        p.on_power_change("cpu0", 10.0, 100);
        p.on_power_change("cpu1", 20.0, 100);
        assert_eq!(p.total_energy(), 10.0 * 100.0 + 20.0 * 100.0);
    }

    #[test]
    fn cycles_hist_indexes_match_class() {
        let mut p = Profiler::new();
        p.on_executed(CycleClass::User, 10);
        p.on_executed(CycleClass::Energy, 20);
        p.on_executed(CycleClass::Balance, 30);
        p.on_executed(CycleClass::Idle, 40);
        p.on_executed(CycleClass::Slack, 5);
        assert_eq!(p.cycles_hist(), [10, 20, 30, 40, 5]);
        assert_eq!(p.cycles_hist_folded(), [10, 20, 30, 45]);
    }

    #[test]
    fn cycles_repartition_sums_to_100() {
        let mut p = Profiler::new();
        p.on_executed(CycleClass::User, 1);
        p.on_executed(CycleClass::Idle, 3);
        let rep = p.cycles_repartition();
        let sum: f64 = rep.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cycles_repartition_is_zero_with_no_data() {
        let p = Profiler::new();
        assert_eq!(p.cycles_repartition(), [0.0; 4]);
    }

    #[test]
    fn task_counters_track_creation_and_termination() {
        let mut p = Profiler::new();
        assert!(p.created_task() >= p.ended_task());
        p.on_new_task();
        p.on_new_task();
        p.on_task_end();
        assert_eq!(p.created_task(), 2);
        assert_eq!(p.ended_task(), 1);
        assert!(p.created_task() >= p.ended_task());
    }

    #[test]
    fn placement_counters_track_each_kind() {
        let mut p = Profiler::new();
        p.on_placement(PlacementKind::EnergyAware);
        p.on_placement(PlacementKind::EnergyAware);
        p.on_placement(PlacementKind::LoadBalancing);
        assert_eq!(p.placed_energy_aware(), 2);
        assert_eq!(p.placed_load_balancing(), 1);
    }
}
