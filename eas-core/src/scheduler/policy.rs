/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Extension points for energy-aware scheduling behavior.
//!
//! The original variant hierarchy used multiple inheritance to override one
//! of two methods on the core scheduler. Mixin inheritance doesn't have a
//! natural Rust analogue, so each extension point is re-architected as a
//! narrow, independently testable strategy value owned by [`Eas`](super::Eas)
//! instead: [`OverUtilPolicy`] decides whether the system is over-utilized,
//! [`PlacementPolicy`] decides which CPU is the energy-efficient placement
//! target. Composing the two reproduces every named variant without mixin
//! inheritance.

use std::collections::BTreeMap;

use crate::cpu::PerfDom;
use crate::energy_model::{EnergyModel, Landscape};
use crate::error::InvariantViolation;

/// Decides whether the scheduling domain is "over-utilized" — the signal
/// that routes wake-up placement through the load-balancing branch instead
/// of the energy-aware branch.
#[derive(Debug, Clone)]
pub enum OverUtilPolicy {
    /// The baseline rule (§4.6): true iff any CPU's load exceeds 80%,
    /// re-evaluated from scratch on every call with no memory of past
    /// calls.
    Default,
    /// Always false: the energy-aware path is always taken.
    Disabled,
    /// True iff at least `k` CPUs have load > 80%.
    Manycores { k: usize },
    /// Hysteresis: latch true at load ≥ 80%, stay true while any CPU is
    /// ≥ 70%, drop once all CPUs fall below 70%.
    Twolimits { was_over_utilized: bool },
    /// `Manycores`' count-based latch threshold combined with
    /// `Twolimits`' sustain threshold.
    TwolimitsManycores { k: usize, was_over_utilized: bool },
}

impl OverUtilPolicy {
    pub fn manycores_default(cpu_count: usize) -> Self {
        Self::Manycores { k: cpu_count / 2 }
    }

    pub fn twolimits() -> Self {
        Self::Twolimits {
            was_over_utilized: false,
        }
    }

    pub fn twolimits_manycores_default(cpu_count: usize) -> Self {
        Self::TwolimitsManycores {
            k: cpu_count / 2,
            was_over_utilized: false,
        }
    }

    /// `loads` is each CPU's load percentage, in scheduler order.
    pub fn evaluate(&mut self, loads: &[f64]) -> bool {
        match self {
            OverUtilPolicy::Default => loads.iter().any(|&load| load > 80.0),

            OverUtilPolicy::Disabled => false,

            OverUtilPolicy::Manycores { k } => {
                let mut count = 0usize;
                for &load in loads {
                    if load > 80.0 {
                        count += 1;
                        if count >= *k {
                            return true;
                        }
                    }
                }
                false
            }

            OverUtilPolicy::Twolimits { was_over_utilized } => {
                eval_twolimits(loads, was_over_utilized, |load| load >= 80.0)
            }

            OverUtilPolicy::TwolimitsManycores {
                k,
                was_over_utilized,
            } => {
                let k = *k;
                let mut count = 0usize;
                eval_twolimits(loads, was_over_utilized, |load| {
                    if load >= 80.0 {
                        count += 1;
                        count >= k
                    } else {
                        false
                    }
                })
            }
        }
    }
}

/// Shared hysteresis evaluator for the two `Twolimits` variants: `latch`
/// decides whether this CPU's load crosses the high (latching) threshold;
/// the low threshold that sustains an already-latched state is always 70%.
fn eval_twolimits(
    loads: &[f64],
    was_over_utilized: &mut bool,
    mut latch: impl FnMut(f64) -> bool,
) -> bool {
    let mut above_lower_limit = false;

    for &load in loads {
        if latch(load) {
            *was_over_utilized = true;
            return true;
        } else if *was_over_utilized && load >= 70.0 {
            above_lower_limit = true;
        }
    }

    if !above_lower_limit {
        *was_over_utilized = false;
    }
    above_lower_limit
}

// ── Placement ─────────────────────────────────────────────────────────────────

/// The outcome of an energy-efficient placement search: the chosen CPU
/// index plus the complexity count accumulated while searching (used to
/// size the injected overhead task).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementChoice {
    pub cpu_index: usize,
    pub complexity: u64,
}

/// Picks the energy-efficient placement target for the wake-up balancer's
/// non-overloaded branch.
#[derive(Debug, Clone)]
pub enum PlacementPolicy {
    /// Per domain, the candidate is the CPU with the lowest run-queue cap
    /// (ties broken by first-seen order).
    Default,
    /// Per domain, the candidate is found by a next-fit scan starting just
    /// after a remembered cursor index, advancing circularly while the
    /// visited CPU's cap is strictly greater than the cap observed at the
    /// cursor before the scan began.
    CorechoiceNextfit { cursor: BTreeMap<PerfDom, usize> },
}

impl PlacementPolicy {
    pub fn corechoice_nextfit() -> Self {
        Self::CorechoiceNextfit {
            cursor: BTreeMap::new(),
        }
    }

    /// `domain_order` lists domains in first-seen order; `cpus_per_domain`
    /// maps each domain to its member CPU indices in scheduler order;
    /// `caps[i]` is CPU `i`'s current run-queue cap; `task_remaining` is the
    /// waking task's remaining cycles.
    #[allow(clippy::too_many_arguments)]
    pub fn choose(
        &mut self,
        domain_order: &[PerfDom],
        cpus_per_domain: &BTreeMap<PerfDom, Vec<usize>>,
        cpu_names: &[String],
        caps: &[u64],
        em: &EnergyModel,
        task_remaining: u64,
    ) -> Result<PlacementChoice, InvariantViolation> {
        let mut complexity = 0u64;

        let candidates: Vec<usize> = match self {
            PlacementPolicy::Default => {
                let mut out = Vec::with_capacity(domain_order.len());
                for domain in domain_order {
                    let members = &cpus_per_domain[domain];
                    complexity += 4 * members.len() as u64;
                    let mut best = members[0];
                    for &idx in &members[1..] {
                        if caps[idx] < caps[best] {
                            best = idx;
                        }
                    }
                    out.push(best);
                }
                out
            }

            PlacementPolicy::CorechoiceNextfit { cursor } => {
                let mut out = Vec::with_capacity(domain_order.len());
                for domain in domain_order {
                    let members = &cpus_per_domain[domain];
                    let start = *cursor.get(domain).unwrap_or(&0) % members.len();
                    let previous_cap = caps[members[start]];

                    // Guaranteed to terminate within one full circle: revisiting `start`
                    // itself always satisfies `cap > previous_cap` as false.
                    let mut i = (start + 1) % members.len();
                    let chosen = loop {
                        complexity += 4;
                        let visited = members[i];
                        if caps[visited] > previous_cap {
                            i = (i + 1) % members.len();
                            continue;
                        }
                        break visited;
                    };

                    let chosen_pos = members.iter().position(|&c| c == chosen).unwrap();
                    cursor.insert(domain.clone(), chosen_pos);
                    out.push(chosen);
                }
                out
            }
        };

        let mut landscape: Landscape = cpu_names
            .iter()
            .cloned()
            .zip(caps.iter().copied())
            .collect();

        let mut lowest_energy = f64::INFINITY;
        let mut chosen_cpu = candidates[0];

        for &candidate in &candidates {
            let name = &cpu_names[candidate];
            *landscape.get_mut(name).expect("candidate cpu in landscape") += task_remaining;

            let (power, work) = em.compute(&landscape)?;
            complexity += work;
            if (power as f64) < lowest_energy {
                lowest_energy = power as f64;
                chosen_cpu = candidate;
            }

            *landscape.get_mut(name).expect("candidate cpu in landscape") -= task_remaining;
        }

        complexity += 4 * domain_order.len() as u64;

        Ok(PlacementChoice {
            cpu_index: chosen_cpu,
            complexity,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manycores_requires_k_cpus_above_threshold() {
        let mut p = OverUtilPolicy::Manycores { k: 4 };
        assert!(!p.evaluate(&[90.0, 90.0, 90.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!(p.evaluate(&[90.0, 90.0, 90.0, 81.0, 0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn disabled_never_over_utilized() {
        let mut p = OverUtilPolicy::Disabled;
        assert!(!p.evaluate(&[100.0, 100.0, 100.0]));
    }

    #[test]
    fn twolimits_latches_and_sustains_hysteresis() {
        let mut p = OverUtilPolicy::twolimits();
        assert!(p.evaluate(&[50.0, 85.0, 50.0, 50.0])); // latches at >=80
        assert!(p.evaluate(&[50.0, 75.0, 50.0, 50.0])); // sustained: one CPU >=70
        assert!(!p.evaluate(&[50.0, 69.0, 50.0, 50.0])); // all fall below 70: drops
    }

    #[test]
    fn nextfit_accepts_first_candidate_with_no_steeper_cap() {
        let domain = PerfDom::new("d");
        let domain_order = vec![domain.clone()];
        let mut cpus_per_domain = BTreeMap::new();
        cpus_per_domain.insert(domain.clone(), vec![0, 1, 2, 3]);
        let cpu_names: Vec<String> = vec!["A", "B", "C", "D"]
            .into_iter()
            .map(String::from)
            .collect();
        let cpus = vec![
            crate::cpu::Cpu::new("A", domain.clone(), vec![crate::cpu::PState::new(100, 1)]),
            crate::cpu::Cpu::new("B", domain.clone(), vec![crate::cpu::PState::new(100, 1)]),
            crate::cpu::Cpu::new("C", domain.clone(), vec![crate::cpu::PState::new(100, 1)]),
            crate::cpu::Cpu::new("D", domain.clone(), vec![crate::cpu::PState::new(100, 1)]),
        ];
        let em = EnergyModel::new(&cpus);

        // all caps equal: cursor at A (index 0), should accept B immediately.
        let mut policy = PlacementPolicy::corechoice_nextfit();
        let caps = vec![5, 5, 5, 5];
        let choice = policy
            .choose(&domain_order, &cpus_per_domain, &cpu_names, &caps, &em, 0)
            .unwrap();
        assert_eq!(choice.cpu_index, 1); // B

        // raise B's cap above A's (the stored cursor is now B, index 1): scan restarts
        // from a fresh cursor at A for this second call to isolate the behavior under test.
        let mut policy = PlacementPolicy::corechoice_nextfit();
        let caps = vec![5, 10, 5, 5];
        let choice = policy
            .choose(&domain_order, &cpus_per_domain, &cpu_names, &caps, &em, 0)
            .unwrap();
        assert_eq!(choice.cpu_index, 2); // B rejected (10 > 5), C accepted (5 > 5 is false)
    }
}
