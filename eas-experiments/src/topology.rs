/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CPU template catalog and topology-descriptor expansion.
//!
//! Grounded in `cpu/cpu_gen.py`'s `CPUGenerator`: three performance-domain
//! templates (little, middle, big), each a fixed ascending P-state table
//! over a domain-specific frequency range. `capacity = f × 10⁹` for `f` in
//! GHz, `power = ⌈f^1.5 × 10⌉`.

use eas_core::cpu::{Cpu, PState, PerfDom};

fn freq_hz(ghz: f64) -> u64 {
    (ghz * 1_000_000_000.0) as u64
}

fn energy(ghz: f64) -> u64 {
    (ghz.powf(1.5) * 10.0).ceil() as u64
}

/// Builds an ascending `(capacity, power)` table by stepping `start..=stop`
/// in `0.25` GHz increments.
fn pstate_table(start: f64, stop: f64) -> Vec<PState> {
    let steps = ((stop - start) / 0.25).round() as i64;
    (0..=steps)
        .map(|i| {
            let ghz = start + i as f64 * 0.25;
            PState::new(freq_hz(ghz), energy(ghz))
        })
        .collect()
}

/// Builds concrete [`Cpu`] values from a `{little, middle, big}` topology
/// descriptor. CPU names are sequential and unique across the whole
/// topology (`cpu0`, `cpu1`, ...) regardless of domain, since a run-queue
/// landscape keys on name.
pub struct CpuGenerator;

impl CpuGenerator {
    pub fn gen(little: usize, middle: usize, big: usize) -> Vec<Cpu> {
        let mut cpus = Vec::with_capacity(little + middle + big);
        let mut next_id = 0u64;

        let mut push_domain = |count: usize, domain: &str, pstates: Vec<PState>| {
            for _ in 0..count {
                cpus.push(Cpu::new(
                    format!("cpu{next_id}"),
                    PerfDom::new(domain),
                    pstates.clone(),
                ));
                next_id += 1;
            }
        };

        push_domain(little, "little", pstate_table(0.5, 2.0));
        push_domain(middle, "middle", pstate_table(1.5, 3.0));
        push_domain(big, "big", pstate_table(2.5, 4.0));

        cpus
    }
}

/// A named topology descriptor, as enumerated by `original_source/run-experiments.py`'s
/// `experiment_args` list.
pub struct Topology {
    pub description: &'static str,
    pub little: usize,
    pub middle: usize,
    pub big: usize,
}

pub const DEFAULT_TOPOLOGIES: &[Topology] = &[
    Topology { description: "2_little_2_middle", little: 2, middle: 2, big: 0 },
    Topology { description: "4_little_4_middle", little: 4, middle: 4, big: 0 },
    Topology { description: "8_little_8_middle", little: 8, middle: 8, big: 0 },
    Topology { description: "16_little_16_middle", little: 16, middle: 16, big: 0 },
    Topology { description: "32_little_32_middle", little: 32, middle: 32, big: 0 },
    Topology { description: "16_little_16_middle_16_big", little: 16, middle: 16, big: 16 },
    Topology { description: "32_little_32_middle_32_big", little: 32, middle: 32, big: 32 },
];

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_template_spans_0_5_to_2_0_ghz_in_quarter_steps() {
        let cpus = CpuGenerator::gen(1, 0, 0);
        let pstates = cpus[0].pstates();
        assert_eq!(pstates.len(), 7);
        assert_eq!(pstates[0], PState::new(500_000_000, 4));
        assert_eq!(pstates.last().unwrap(), &PState::new(2_000_000_000, 29));
    }

    #[test]
    fn generated_cpu_names_are_unique_and_sequential() {
        let cpus = CpuGenerator::gen(2, 2, 2);
        let names: Vec<&str> = cpus.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["cpu0", "cpu1", "cpu2", "cpu3", "cpu4", "cpu5"]);
    }

    #[test]
    fn domains_are_assigned_in_little_middle_big_order() {
        let cpus = CpuGenerator::gen(1, 1, 1);
        assert_eq!(cpus[0].perf_domain(), &PerfDom::new("little"));
        assert_eq!(cpus[1].perf_domain(), &PerfDom::new("middle"));
        assert_eq!(cpus[2].perf_domain(), &PerfDom::new("big"));
    }

    #[test]
    fn default_topologies_match_the_original_experiment_matrix() {
        assert_eq!(DEFAULT_TOPOLOGIES.len(), 7);
        assert_eq!(DEFAULT_TOPOLOGIES[4].description, "32_little_32_middle");
    }
}
