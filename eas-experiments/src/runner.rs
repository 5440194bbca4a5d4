/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Drives repeated simulations across scheduler variants for one CPU
//! topology, diffs each variant against the baseline `EAS`, and writes the
//! two CSV result files described in §6.
//!
//! Grounded in `original_source/run-experiments.py`'s `run_experiment_on`:
//! same repetition loop, same baseline-diff bookkeeping, same CSV columns.
//! The difference is structural, not behavioral — one thread per topology
//! via [`std::thread::scope`] instead of one OS process per topology via
//! `multiprocessing.Process`.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use eas_core::cpu::Cpu;
use eas_core::load_gen::LoadGenerator;
use eas_core::scheduler::{Eas, OverUtilPolicy, PlacementPolicy};
use tracing::info;

/// Parameters shared by every variant and repetition in a run, mirroring
/// `original_source/run-experiments.py`'s module-level constants.
#[derive(Debug, Clone)]
pub struct ExperimentParams {
    pub repetitions: u32,
    pub seed: u64,
    pub pick_distrib_insts: u64,
    pub max_distrib_insts: u64,
    pub create_task_prob: f64,
    pub tick_ms: u64,
    pub run_duration_ms: u64,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            repetitions: 100,
            seed: 1,
            pick_distrib_insts: 100_000_000,
            max_distrib_insts: 4_000_000_000,
            create_task_prob: 0.999,
            tick_ms: 1,
            run_duration_ms: 60_000,
        }
    }
}

/// One named scheduler configuration under comparison. `"EAS"` is always
/// the baseline every other row is diffed against.
struct Variant {
    name: &'static str,
    over_util: fn(usize) -> OverUtilPolicy,
    placement: fn() -> PlacementPolicy,
}

fn variants() -> Vec<Variant> {
    vec![
        Variant { name: "EAS", over_util: |_| OverUtilPolicy::Default, placement: || PlacementPolicy::Default },
        Variant { name: "EASOverutilDisabled", over_util: |_| OverUtilPolicy::Disabled, placement: || PlacementPolicy::Default },
        Variant { name: "EASOverutilTwolimits", over_util: |_| OverUtilPolicy::twolimits(), placement: || PlacementPolicy::Default },
        Variant { name: "EASOverutilManycores", over_util: OverUtilPolicy::manycores_default, placement: || PlacementPolicy::Default },
        Variant { name: "EASCorechoiceNextfit", over_util: |_| OverUtilPolicy::Default, placement: PlacementPolicy::corechoice_nextfit },
        Variant {
            name: "EASCorechoiceNextfitOverutilTwolimits",
            over_util: |_| OverUtilPolicy::twolimits(),
            placement: PlacementPolicy::corechoice_nextfit,
        },
    ]
}

/// One repetition's summary statistics for a single variant run.
#[derive(Debug, Clone, Copy)]
struct RunStats {
    energy: f64,
    task_cycles: u64,
    energy_cycles: u64,
    balance_cycles: u64,
    idle_cycles: u64,
    placed_energy_aware: u64,
    placed_load_balancing: u64,
}

/// Run one repetition for `variant`, consuming and returning `load_gen` so
/// the caller's PRNG streams keep advancing across repetitions instead of
/// restarting from the same seed every time (`original_source/run-experiments.py`
/// builds its `load_generators` dict once, outside the repetition loop, for
/// exactly this reason).
fn run_once(
    cpus: &[Cpu],
    params: &ExperimentParams,
    variant: &Variant,
    load_gen: LoadGenerator,
) -> Result<(RunStats, LoadGenerator), eas_core::InvariantViolation> {
    let mut eas = Eas::new(
        cpus.to_vec(),
        load_gen,
        (variant.over_util)(cpus.len()),
        (variant.placement)(),
        params.tick_ms,
    );
    eas.run(params.run_duration_ms)?;

    let p = eas.profiler();
    let hist = p.cycles_hist_folded();
    let stats = RunStats {
        energy: p.total_energy(),
        task_cycles: hist[0],
        energy_cycles: hist[1],
        balance_cycles: hist[2],
        idle_cycles: hist[3],
        placed_energy_aware: p.placed_energy_aware(),
        placed_load_balancing: p.placed_load_balancing(),
    };
    Ok((stats, eas.into_load_gen()))
}

/// Run every variant, for every repetition, on `cpus`, and write
/// `diff_<description>.csv` and `placement_<description>.csv` under
/// `out_dir`.
pub fn run_experiment_on(cpus: &[Cpu], description: &str, params: &ExperimentParams, out_dir: &Path) -> Result<()> {
    info!(description, cpu_count = cpus.len(), "starting experiment");

    let versions = variants();
    let mut diffs: Vec<Vec<[f64; 5]>> = vec![Vec::with_capacity(params.repetitions as usize); versions.len()];
    let mut placements: Vec<Vec<(u64, u64)>> = vec![Vec::with_capacity(params.repetitions as usize); versions.len()];

    // One generator per variant, built once before the repetition loop:
    // every version stays in lockstep (each `run` issues the same number of
    // `gen()` calls), but the PRNG streams advance across repetitions rather
    // than replaying the same workload every time.
    let mut load_gens: Vec<Option<LoadGenerator>> = versions
        .iter()
        .map(|_| {
            Some(LoadGenerator::new(
                params.pick_distrib_insts,
                params.max_distrib_insts,
                params.create_task_prob,
                params.seed,
            ))
        })
        .collect();

    for rep in 0..params.repetitions {
        let mut baseline: Option<RunStats> = None;

        for (idx, variant) in versions.iter().enumerate() {
            let load_gen = load_gens[idx].take().expect("load generator reinserted after every run_once");
            let (stats, load_gen) = run_once(cpus, params, variant, load_gen)
                .with_context(|| format!("variant {} repetition {rep} on {description}", variant.name))?;
            load_gens[idx] = Some(load_gen);

            if variant.name == "EAS" {
                baseline = Some(stats);
            } else if let Some(base) = baseline {
                diffs[idx].push([
                    (stats.energy / base.energy - 1.0) * 100.0,
                    (stats.task_cycles as f64 / base.task_cycles as f64 - 1.0) * 100.0,
                    (stats.energy_cycles as f64 / base.energy_cycles as f64 - 1.0) * 100.0,
                    (stats.balance_cycles as f64 / base.balance_cycles as f64 - 1.0) * 100.0,
                    (stats.idle_cycles as f64 / base.idle_cycles as f64 - 1.0) * 100.0,
                ]);
            }

            placements[idx].push((stats.placed_energy_aware, stats.placed_load_balancing));
        }
    }

    write_diffs(&versions, &diffs, &out_dir.join(format!("diff_{description}.csv")))?;
    write_placements(&versions, &placements, &out_dir.join(format!("placement_{description}.csv")))?;

    info!(description, "experiment complete");
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn write_diffs(versions: &[Variant], diffs: &[Vec<[f64; 5]>], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = csv::Writer::from_writer(file);
    w.write_record([
        "Version",
        "Energy diff %",
        "Task cycles diff %",
        "Energy cycles diff %",
        "Balance cycles diff %",
        "Idle cycles diff %",
    ])?;

    for (variant, hist) in versions.iter().zip(diffs).skip(1) {
        let cols: Vec<f64> = (0..5).map(|i| mean(&hist.iter().map(|h| h[i]).collect::<Vec<_>>())).collect();
        w.write_record([
            variant.name.to_string(),
            round1(cols[0]).to_string(),
            round1(cols[1]).to_string(),
            round1(cols[2]).to_string(),
            round1(cols[3]).to_string(),
            round1(cols[4]).to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_placements(versions: &[Variant], placements: &[Vec<(u64, u64)>], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = csv::Writer::from_writer(file);
    w.write_record(["Version", "Proportion % of task placed by energy aware mean"])?;

    for (variant, hist) in versions.iter().zip(placements) {
        let proportions: Vec<f64> = hist
            .iter()
            .map(|&(energy, balance)| {
                let total = (energy + balance) as f64;
                if total == 0.0 {
                    0.0
                } else {
                    energy as f64 / total * 100.0
                }
            })
            .collect();
        w.write_record([variant.name.to_string(), round1(mean(&proportions)).to_string()])?;
    }
    w.flush()?;
    Ok(())
}
