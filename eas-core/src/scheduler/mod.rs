/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The energy-aware scheduler core: per-CPU run-queues, the discrete tick
//! loop, the wake-up balancer, the periodic load balancer, and the
//! over-utilization predicate.
//!
//! All policy variation is expressed through the two strategy values in
//! [`policy`] — [`OverUtilPolicy`] and [`PlacementPolicy`] — rather than
//! through subclassing. This module owns everything else: CPU bookkeeping,
//! run-queues, the tick loop, the default wake-up and load-balancing
//! algorithms the strategies can override.

pub mod policy;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::cpu::{Cpu, PerfDom};
use crate::energy_model::{EnergyModel, Landscape};
use crate::error::InvariantViolation;
use crate::governor::Schedutil;
use crate::load_gen::LoadGenerator;
use crate::profiler::{PlacementKind, Profiler};
use crate::runqueue::RunQueue;
use crate::task::{Task, TaskClass};

pub use policy::{OverUtilPolicy, PlacementChoice, PlacementPolicy};

/// The scheduler, parameterized by its over-utilization and placement
/// strategies. Single-threaded, deterministic given its seed and CPU list
/// (§5).
pub struct Eas {
    cpus: Vec<Cpu>,
    domain_order: Vec<PerfDom>,
    cpus_per_domain: BTreeMap<PerfDom, Vec<usize>>,
    run_queues: Vec<RunQueue>,
    idle_task: Task,

    load_gen: LoadGenerator,
    governor: Schedutil,
    em: EnergyModel,
    profiler: Profiler,

    over_util: OverUtilPolicy,
    placement: PlacementPolicy,

    clock_ms: u64,
    tick_ms: u64,
}

impl Eas {
    /// Build a scheduler over `cpus` in the given order. Performance
    /// domains are derived in first-seen order.
    pub fn new(
        cpus: Vec<Cpu>,
        load_gen: LoadGenerator,
        over_util: OverUtilPolicy,
        placement: PlacementPolicy,
        tick_ms: u64,
    ) -> Self {
        let em = EnergyModel::new(&cpus);

        let mut domain_order = Vec::new();
        let mut cpus_per_domain: BTreeMap<PerfDom, Vec<usize>> = BTreeMap::new();
        for (idx, cpu) in cpus.iter().enumerate() {
            let domain = cpu.perf_domain().clone();
            if !cpus_per_domain.contains_key(&domain) {
                domain_order.push(domain.clone());
            }
            cpus_per_domain.entry(domain).or_default().push(idx);
        }

        let run_queues = cpus.iter().map(|_| RunQueue::new()).collect();

        Self {
            cpus,
            domain_order,
            cpus_per_domain,
            run_queues,
            idle_task: Task::idle(),
            load_gen,
            governor: Schedutil::new(),
            em,
            profiler: Profiler::new(),
            over_util,
            placement,
            clock_ms: 0,
            tick_ms,
        }
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn cpus(&self) -> &[Cpu] {
        &self.cpus
    }

    /// Reclaim the load generator, consuming this scheduler. Lets a caller
    /// run several repetitions with the same PRNG streams: construct a new
    /// `Eas` for each repetition's fresh CPUs/run-queues/profiler while the
    /// generator's streams keep advancing across repetitions instead of
    /// restarting from the same seed every time.
    pub fn into_load_gen(self) -> LoadGenerator {
        self.load_gen
    }

    /// Current run-queue `cap` (sum of remaining cycles) for CPU `cpu_idx`.
    pub fn run_queue_cap(&self, cpu_idx: usize) -> u64 {
        self.run_queues[cpu_idx].cap()
    }

    /// Submit `task` for placement via the wake-up balancer, as if it had
    /// just been generated at the current tick. Exposed for deterministic
    /// tests and one-off experiment setups that need to seed initial load
    /// before calling [`run`](Self::run).
    pub fn dispatch(&mut self, by_cpu: usize, task: Task) -> Result<usize, InvariantViolation> {
        self.profiler.on_new_task();
        let dest = self.wake_up_balance(by_cpu, &task)?;
        self.run_queues[dest].insert(task);
        Ok(dest)
    }

    /// Run the scheduler for `total_ms` simulated milliseconds (§4.6).
    pub fn run(&mut self, total_ms: u64) -> Result<(), InvariantViolation> {
        while self.clock_ms < total_ms {
            if self.clock_ms % 1000 == 0 && self.is_over_utilized()? {
                self.load_balance()?;
            }

            for cpu_idx in 0..self.cpus.len() {
                if let Some(new_task) = self.load_gen.gen() {
                    self.profiler.on_new_task();
                    let dest = self.wake_up_balance(cpu_idx, &new_task)?;
                    self.run_queues[dest].insert(new_task);
                }

                self.apply_governor()?;

                let mut task = self.run_queues[cpu_idx].pop_smallest().unwrap_or_else(|| {
                    // The idle task never terminates; cloning it each tick is
                    // cheap and avoids fighting the borrow checker over a
                    // shared singleton while this CPU executes it.
                    self.idle_task.clone()
                });
                let is_idle = task.class() == TaskClass::Idle;

                self.cpus[cpu_idx].execute_for(&mut task, self.tick_ms, &mut self.profiler);

                if !is_idle {
                    if !task.terminated() {
                        self.run_queues[cpu_idx].insert(task);
                    } else if !task.class().is_kernel() {
                        self.profiler.on_task_end();
                    }
                }

                self.apply_governor()?;
            }

            self.clock_ms += self.tick_ms;
        }

        // §4.7: total_energy is updated "whenever a CPU's power changes and
        // at teardown" — without this, the dwell time of each CPU's final
        // P-state between its last governor update and `total_ms` is never
        // integrated into total_energy.
        self.profiler.flush(self.clock_ms);
        Ok(())
    }

    fn apply_governor(&mut self) -> Result<(), InvariantViolation> {
        let landscape = self.landscape();
        self.governor
            .update(&mut self.cpus, &landscape, &mut self.profiler, self.clock_ms)
    }

    fn landscape(&self) -> Landscape {
        self.cpus
            .iter()
            .zip(self.run_queues.iter())
            .map(|(cpu, rq)| (cpu.name().to_string(), rq.cap()))
            .collect()
    }

    fn load_percent(&self, cpu_idx: usize) -> f64 {
        self.run_queues[cpu_idx].cap() as f64 / self.cpus[cpu_idx].max_capacity() as f64 * 100.0
    }

    fn loads(&self) -> Vec<f64> {
        (0..self.cpus.len()).map(|i| self.load_percent(i)).collect()
    }

    fn is_over_utilized(&mut self) -> Result<bool, InvariantViolation> {
        let loads = self.loads();
        Ok(self.over_util.evaluate(&loads))
    }

    /// §4.6 wake-up balancer: over-utilized routes through load-balancing
    /// placement with a flat overhead charge; otherwise the energy-aware
    /// placement policy decides.
    fn wake_up_balance(&mut self, by_cpu: usize, task: &Task) -> Result<usize, InvariantViolation> {
        if self.is_over_utilized()? {
            let mut dest = by_cpu;
            for i in 0..self.cpus.len() {
                if self.run_queues[i].cap() == 0 {
                    dest = i;
                }
            }

            let overhead = Task::new(10 * self.cpus.len() as u64, TaskClass::Balance);
            self.run_queues[by_cpu].insert_overhead(overhead);
            self.profiler.on_placement(PlacementKind::LoadBalancing);
            trace!(cpu = by_cpu, dest, "wake-up: load-balancing placement");
            Ok(dest)
        } else {
            let caps: Vec<u64> = self.run_queues.iter().map(RunQueue::cap).collect();
            let cpu_names: Vec<String> = self.cpus.iter().map(|c| c.name().to_string()).collect();

            let choice = self.placement.choose(
                &self.domain_order,
                &self.cpus_per_domain,
                &cpu_names,
                &caps,
                &self.em,
                task.remaining_cycles(),
            )?;

            let overhead = Task::new(100 * choice.complexity, TaskClass::Energy);
            self.run_queues[by_cpu].insert_overhead(overhead);
            self.profiler.on_placement(PlacementKind::EnergyAware);
            trace!(cpu = by_cpu, dest = choice.cpu_index, "wake-up: energy-aware placement");
            Ok(choice.cpu_index)
        }
    }

    /// §4.6 periodic load balancer: migrate the largest-vr task from the
    /// most-loaded CPU to any idle one, charging overhead to CPU 0.
    fn load_balance(&mut self) -> Result<(), InvariantViolation> {
        let mut idle_cpu = None;
        let mut overloaded = None::<(usize, f64)>;

        for i in 0..self.cpus.len() {
            let load = self.load_percent(i);
            if load == 0.0 {
                idle_cpu = Some(i);
            } else if overloaded.map_or(true, |(_, best)| load > best) {
                overloaded = Some((i, load));
            }
        }

        let Some(idle) = idle_cpu else {
            debug!("load balance: no idle CPU found, skipping migration");
            return Ok(());
        };
        let Some((source, _)) = overloaded else {
            return Ok(());
        };

        let src_size_pre = self.run_queues[source].size();

        if let Some(task) = self.run_queues[source].pop_largest() {
            self.run_queues[idle].insert(task);
        }

        let dst_size_post = self.run_queues[idle].size();

        let mut complexity = self.cpus.len() as u64;
        complexity += (((src_size_pre + 1) as f64).log2() * 2.0).ceil() as u64;
        let dst_term = ((dst_size_post as i64 - 1) as f64).log2();
        if dst_term.is_finite() && dst_term > 0.0 {
            complexity += dst_term.ceil() as u64;
        }

        let overhead = Task::new(100 * complexity, TaskClass::Balance);
        self.run_queues[0].insert_overhead(overhead);
        debug!(source, idle, complexity, "periodic load balance");
        Ok(())
    }
}
