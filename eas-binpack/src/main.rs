/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Monte-Carlo comparison of the `Worstfit` and `NextfitCond` bin-packing
//! placers.
//!
//! Grounded in `original_source/bin_packing.py`'s `run_experiment_with`:
//! same bin counts, load totals, item counts and repetition count, same
//! per-repetition PRNG seeding (`Pcg64::seed_from_u64(repetition)` in place
//! of `numpy.random.Generator(numpy.random.PCG64(repetition))`), same two
//! output files per bin count. Shares no code with the scheduler core
//! (`eas-core`) — not even the PRNG seeding convention, which here seeds
//! per-repetition rather than per-simulation.

mod placer;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use placer::{NextfitCond, Placer, Worstfit};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::info;
use tracing_subscriber::EnvFilter;

const REPETITIONS: u32 = 10_000;
const LOAD_TOTALS: [f64; 3] = [20.0, 60.0, 100.0];
const BIN_COUNTS: [usize; 4] = [4, 8, 16, 32];

#[derive(Debug, Parser)]
#[command(name = "eas-binpack")]
struct Cli {
    /// Directory CSV results are written into. Created if missing.
    #[clap(long, default_value = ".")]
    out_dir: std::path::PathBuf,
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn final_loads(bins: &[placer::Bin]) -> Vec<f64> {
    bins.iter().map(|b| b.cap).collect()
}

fn run_experiment_with(nbr_bin: usize, out_dir: &Path) -> Result<()> {
    let diff_path = out_dir.join(format!("diff_nextfitcond_worstfit_{nbr_bin}bins.csv"));
    let steps_path = out_dir.join(format!("steps_nextfitcond_worstfit_{nbr_bin}bins.csv"));
    let mut diff_file =
        File::create(&diff_path).with_context(|| format!("creating {}", diff_path.display()))?;
    let mut steps_file =
        File::create(&steps_path).with_context(|| format!("creating {}", steps_path.display()))?;

    for &total_val in &LOAD_TOTALS {
        for &nbr_item in &[nbr_bin * 2, nbr_bin * 4] {
            let mut std_diff_hist = Vec::with_capacity(REPETITIONS as usize);
            let mut step_hist = Vec::with_capacity(REPETITIONS as usize);

            for repetition in 0..REPETITIONS {
                let mut rng = Pcg64::seed_from_u64(repetition as u64);
                let mut items: Vec<f64> = (0..nbr_item).map(|_| rng.gen::<f64>()).collect();
                let sum: f64 = items.iter().sum();
                let scale = (nbr_bin as f64 * total_val) / sum;
                for item in &mut items {
                    *item *= scale;
                }

                let mut worstfit = Worstfit::new(nbr_bin);
                let mut nextfit = NextfitCond::new(nbr_bin);
                for &item in &items {
                    worstfit.place(item);
                    nextfit.place(item);
                }

                let worstfit_std = population_std(&final_loads(worstfit.bins()));
                let nextfit_std = population_std(&final_loads(nextfit.bins()));

                std_diff_hist.push(worstfit_std / nextfit_std * 100.0);
                step_hist.push(nextfit.total_step());
            }

            let key = format!("load{}_items{nbr_item}", total_val as u64);
            writeln!(
                diff_file,
                "{key}, {}",
                std_diff_hist
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            writeln!(
                steps_file,
                "{key}, {}",
                step_hist
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let start = std::time::Instant::now();

    // One thread per bin count, mirroring `multiprocessing.Process` per
    // `nbr_bin` in the original — each count's 10,000-repetition sweep is
    // independent of every other's.
    std::thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(BIN_COUNTS.len());
        for &nbr_bin in &BIN_COUNTS {
            let out_dir = &cli.out_dir;
            handles.push(scope.spawn(move || run_experiment_with(nbr_bin, out_dir)));
        }
        for handle in handles {
            handle
                .join()
                .unwrap_or_else(|e| Err(anyhow::anyhow!("bin-packing thread panicked: {e:?}")))?;
        }
        Ok(())
    })?;

    info!(elapsed_secs = start.elapsed().as_secs_f64(), "bin-packing study complete");
    Ok(())
}
