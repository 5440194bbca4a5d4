/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CLI entry point for the variant-comparison experiment runner.
//!
//! Drives [`runner::run_experiment_on`] once per CPU topology, writing the
//! `diff_<topology>.csv` and `placement_<topology>.csv` pair described in
//! §6 into `--out-dir`. Topologies default to the matrix in
//! [`topology::DEFAULT_TOPOLOGIES`], matching
//! `original_source/run-experiments.py`'s `experiment_args` list.

mod runner;
mod topology;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use runner::ExperimentParams;
use topology::{CpuGenerator, DEFAULT_TOPOLOGIES};
use tracing_subscriber::EnvFilter;

/// Compare EAS scheduler variants against the baseline across CPU
/// topologies.
#[derive(Debug, Parser)]
#[command(name = "eas-experiments")]
struct Cli {
    /// Repetitions per variant per topology.
    #[clap(long, default_value_t = ExperimentParams::default().repetitions)]
    repetitions: u32,

    /// Seed shared by every variant's load generator within a repetition.
    #[clap(long, default_value_t = ExperimentParams::default().seed)]
    seed: u64,

    /// Triangular distribution peak, in instructions.
    #[clap(long, default_value_t = ExperimentParams::default().pick_distrib_insts)]
    pick_distrib_insts: u64,

    /// Triangular distribution high bound, in instructions.
    #[clap(long, default_value_t = ExperimentParams::default().max_distrib_insts)]
    max_distrib_insts: u64,

    /// Probability that no task is emitted on a given tick.
    #[clap(long, default_value_t = ExperimentParams::default().create_task_prob)]
    create_task_prob: f64,

    /// Scheduler tick period, in simulated milliseconds.
    #[clap(long, default_value_t = ExperimentParams::default().tick_ms)]
    tick_ms: u64,

    /// Simulated run duration, in milliseconds.
    #[clap(long, default_value_t = ExperimentParams::default().run_duration_ms)]
    run_duration_ms: u64,

    /// Directory CSV results are written into. Created if missing.
    #[clap(long, default_value = ".")]
    out_dir: PathBuf,
}

impl From<&Cli> for ExperimentParams {
    fn from(cli: &Cli) -> Self {
        Self {
            repetitions: cli.repetitions,
            seed: cli.seed,
            pick_distrib_insts: cli.pick_distrib_insts,
            max_distrib_insts: cli.max_distrib_insts,
            create_task_prob: cli.create_task_prob,
            tick_ms: cli.tick_ms,
            run_duration_ms: cli.run_duration_ms,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let params: ExperimentParams = (&cli).into();

    // One thread per topology: each simulation owns its own scheduler,
    // profiler and PRNG streams (§5), so topologies never share mutable
    // state and can run concurrently without locks.
    std::thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(DEFAULT_TOPOLOGIES.len());
        for topo in DEFAULT_TOPOLOGIES {
            let params = &params;
            let out_dir = &cli.out_dir;
            handles.push(scope.spawn(move || -> Result<()> {
                let cpus = CpuGenerator::gen(topo.little, topo.middle, topo.big);
                runner::run_experiment_on(&cpus, topo.description, params, out_dir)
            }));
        }
        for handle in handles {
            handle
                .join()
                .unwrap_or_else(|e| Err(anyhow::anyhow!("experiment thread panicked: {e:?}")))?;
        }
        Ok(())
    })?;

    Ok(())
}
