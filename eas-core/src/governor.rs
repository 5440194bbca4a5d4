/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedutil-style frequency governor: sets each CPU's P-state to the
//! lowest whose capacity exceeds its current demand.

use crate::cpu::Cpu;
use crate::energy_model::Landscape;
use crate::error::InvariantViolation;
use crate::profiler::Profiler;

/// The frequency governor. Stateless beyond the CPUs it was constructed
/// with — a thin namespace, matching the Python original's single
/// responsibility.
#[derive(Debug, Default)]
pub struct Schedutil;

impl Schedutil {
    pub fn new() -> Self {
        Self
    }

    /// For every CPU, pick the lowest P-state whose capacity exceeds
    /// `landscape[cpu]` (same rule as [`EnergyModel::compute`](crate::energy_model::EnergyModel::compute))
    /// and apply it. Idempotent for an unchanged landscape: re-applying the
    /// same P-state still updates the profiler's timestamp but leaves
    /// `total_energy` correct, since the flushed interval has zero power
    /// delta if `now_ms` hasn't advanced.
    pub fn update(
        &self,
        cpus: &mut [Cpu],
        landscape: &Landscape,
        profiler: &mut Profiler,
        now_ms: u64,
    ) -> Result<(), InvariantViolation> {
        for cpu in cpus.iter_mut() {
            let demand = *landscape.get(cpu.name()).ok_or_else(|| {
                InvariantViolation::MissingCpuInLandscape {
                    cpu: cpu.name().to_string(),
                }
            })?;

            let mut target = *cpu.pstates().last().expect("non-empty pstates");
            for &ps in cpu.pstates() {
                if ps.capacity > demand {
                    target = ps;
                    break;
                }
            }
            cpu.set_pstate(target, profiler, now_ms);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{PState, PerfDom};

    fn cpu() -> Cpu {
        Cpu::new(
            "cpu0",
            PerfDom::new("little"),
            vec![PState::new(10, 5), PState::new(20, 10), PState::new(30, 15)],
        )
    }

    #[test]
    fn update_selects_lowest_pstate_exceeding_demand() {
        let mut cpus = vec![cpu()];
        let mut profiler = Profiler::new();
        let gov = Schedutil::new();
        let mut landscape = Landscape::new();
        landscape.insert("cpu0".to_string(), 15);

        gov.update(&mut cpus, &landscape, &mut profiler, 0).unwrap();
        assert_eq!(cpus[0].pstate(), PState::new(20, 10));
    }

    #[test]
    fn update_is_idempotent_for_unchanged_landscape() {
        let mut cpus = vec![cpu()];
        let mut profiler = Profiler::new();
        let gov = Schedutil::new();
        let mut landscape = Landscape::new();
        landscape.insert("cpu0".to_string(), 15);

        gov.update(&mut cpus, &landscape, &mut profiler, 0).unwrap();
        let first = cpus[0].pstate();
        gov.update(&mut cpus, &landscape, &mut profiler, 0).unwrap();
        assert_eq!(cpus[0].pstate(), first);
    }

    #[test]
    fn update_falls_back_to_highest_pstate_when_demand_exceeds_all() {
        let mut cpus = vec![cpu()];
        let mut profiler = Profiler::new();
        let gov = Schedutil::new();
        let mut landscape = Landscape::new();
        landscape.insert("cpu0".to_string(), 1_000);

        gov.update(&mut cpus, &landscape, &mut profiler, 0).unwrap();
        assert_eq!(cpus[0].pstate(), PState::new(30, 15));
    }

    #[test]
    fn update_errors_on_missing_cpu_in_landscape() {
        let mut cpus = vec![cpu()];
        let mut profiler = Profiler::new();
        let gov = Schedutil::new();
        let landscape = Landscape::new(); // empty

        let err = gov.update(&mut cpus, &landscape, &mut profiler, 0).unwrap_err();
        assert!(matches!(
            err,
            InvariantViolation::MissingCpuInLandscape { .. }
        ));
    }
}
