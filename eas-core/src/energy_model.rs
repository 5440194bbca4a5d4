/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure energy-model computation: estimated total power for a given
//! per-CPU demand landscape.

use std::collections::BTreeMap;

use crate::cpu::{Cpu, PState, PerfDom};
use crate::error::InvariantViolation;

/// A snapshot map CPU name → current aggregate runnable cycles. `BTreeMap`
/// keeps iteration deterministic, matching the rest of the core's
/// preference for ordered maps over `HashMap` wherever iteration order is
/// observable.
pub type Landscape = BTreeMap<String, u64>;

/// Pure function from a per-CPU capacity landscape to estimated total
/// power, parameterized at construction by the P-state table each
/// performance domain shares.
#[derive(Debug, Clone)]
pub struct EnergyModel {
    /// CPUs in scheduler order, paired with their performance domain.
    cpu_domains: Vec<(String, PerfDom)>,
    /// Ascending P-state table shared by every CPU in a domain, captured
    /// from one representative CPU at construction.
    domain_pstates: BTreeMap<PerfDom, Vec<PState>>,
}

impl EnergyModel {
    /// Capture, per performance domain, the P-state table of one
    /// representative CPU. All CPUs of a domain are assumed to share
    /// pstates (§4.4 precondition).
    pub fn new(cpus: &[Cpu]) -> Self {
        let mut domain_pstates = BTreeMap::new();
        let mut cpu_domains = Vec::with_capacity(cpus.len());
        for cpu in cpus {
            domain_pstates
                .entry(cpu.perf_domain().clone())
                .or_insert_with(|| cpu.pstates().to_vec());
            cpu_domains.push((cpu.name().to_string(), cpu.perf_domain().clone()));
        }
        Self {
            cpu_domains,
            domain_pstates,
        }
    }

    /// For each CPU, find the lowest P-state whose capacity strictly
    /// exceeds its landscape demand (falling back to the highest P-state if
    /// none qualifies), and sum that P-state's power across all CPUs.
    ///
    /// Returns `(total_power, work)` where `work` is a monotonic counter of
    /// P-states examined plus one unit of per-CPU overhead — used to charge
    /// the caller a realistic complexity cost (§4.6).
    ///
    /// This function does not mutate `landscape` or any CPU state.
    pub fn compute(&self, landscape: &Landscape) -> Result<(u64, u64), InvariantViolation> {
        let mut total_power = 0u64;
        let mut work = 0u64;

        for (name, domain) in &self.cpu_domains {
            let demand =
                *landscape
                    .get(name)
                    .ok_or_else(|| InvariantViolation::MissingCpuInLandscape {
                        cpu: name.clone(),
                    })?;

            let pstates = self
                .domain_pstates
                .get(domain)
                .expect("every domain in cpu_domains was inserted into domain_pstates");

            let mut chosen = *pstates.last().expect("non-empty pstates");
            for &ps in pstates {
                work += 1;
                if ps.capacity > demand {
                    chosen = ps;
                    break;
                }
            }
            total_power += chosen.power;
            work += 1; // per-CPU overhead
        }

        Ok((total_power, work))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
