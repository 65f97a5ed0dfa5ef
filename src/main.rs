use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ctree_compress::{
    check_assignment, compress_tagged, config, CompressJob, CompressOutput, RankStructure, Strategy,
};
use ctree_netlist::{Netlist, Signal};
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Above this many inputs `--check` samples assignments instead of enumerating them
const EXHAUSTIVE_LIMIT: usize = 16;
const SAMPLED_ASSIGNMENTS: usize = 1024;

/// CTREE - Compressor tree generator for multi-operand addition
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a compressor tree for one rank structure
    Compress {
        /// Job file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Strategy: wallace or dadda (overrides the job file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Signals per weight, lowest weight first (e.g. 3,3,3,0)
        #[arg(long, value_delimiter = ',')]
        heights: Vec<usize>,

        /// Naming prefix for created nodes
        #[arg(long)]
        owner: Option<String>,

        /// Write the resulting netlist as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Simulate the netlist and verify the output value
        #[arg(long)]
        check: bool,
    },

    /// Build both trees for the same ranks and compare them
    Compare {
        /// Signals per weight, lowest weight first
        #[arg(long, value_delimiter = ',', required = true)]
        heights: Vec<usize>,

        /// Simulate each netlist and verify the output value
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Compress {
            config,
            strategy,
            heights,
            owner,
            json,
            check,
        } => {
            let job = load_job(config.as_deref(), strategy, heights, owner)?;
            compress_job(&job, json.as_deref(), check)?;
        }

        Commands::Compare { heights, check } => {
            compare_strategies(&heights, check)?;
        }
    }

    Ok(())
}

fn load_job(
    path: Option<&Path>,
    strategy: Option<String>,
    heights: Vec<usize>,
    owner: Option<String>,
) -> Result<CompressJob> {
    let mut job = match path {
        Some(path) => config::from_path(path)
            .with_context(|| format!("Failed to load job file {}", path.display()))?,
        None => CompressJob::default(),
    };

    if let Some(strategy) = strategy {
        job.compressor.strategy = strategy;
    }
    if let Some(owner) = owner {
        job.compressor.owner = owner;
    }
    if !heights.is_empty() {
        job.ranks.heights = heights;
    }
    Ok(job)
}

/// Everything one compression run produced
struct Run {
    netlist: Netlist,
    ranks: RankStructure,
    output: CompressOutput,
}

fn build(tag: &str, heights: &[usize], owner: &str) -> Result<Run> {
    let mut netlist = Netlist::new(owner);
    let ranks = RankStructure::from_heights(&mut netlist, "pp", heights);
    let snapshot = ranks.clone();
    let output = compress_tagged(tag, ranks, &mut netlist, owner)?;
    Ok(Run {
        netlist,
        ranks: snapshot,
        output,
    })
}

fn compress_job(job: &CompressJob, json: Option<&Path>, check: bool) -> Result<()> {
    let run = build(
        &job.compressor.strategy,
        &job.ranks.heights,
        &job.compressor.owner,
    )?;

    let stats = run.netlist.stats();
    println!("{}", run.output.stats);
    println!(
        "   {} output bits{}",
        run.output.bits.len(),
        if run.output.carry_out.is_some() {
            " (incl. carry-out)"
        } else {
            ""
        }
    );
    println!(
        "   {} nodes created: {} AND, {} OR, {} XOR, {} ADD",
        run.output.created.len(),
        stats.and_gates,
        stats.or_gates,
        stats.xor_gates,
        stats.adders
    );

    if check {
        let checked = verify(&run)?;
        println!("✅ Output value verified on {} assignments", checked);
    }

    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&run.netlist)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("netlist written to {}", path.display());
    }

    Ok(())
}

fn compare_strategies(heights: &[usize], check: bool) -> Result<()> {
    let runs: Vec<(Strategy, Result<Run>)> = Strategy::ALL
        .par_iter()
        .map(|&strategy| (strategy, build(strategy.name(), heights, "top")))
        .collect();

    println!(
        "{:<10} {:>7} {:>5} {:>5} {:>7} {:>6}",
        "strategy", "stages", "FA", "HA", "gates", "width"
    );
    for (strategy, run) in runs {
        let run = run?;
        let stats = &run.output.stats;
        println!(
            "{:<10} {:>7} {:>5} {:>5} {:>7} {:>6}",
            strategy.name(),
            stats.stages,
            stats.full_adders,
            stats.half_adders,
            run.netlist.stats().logic_gates(),
            run.output.bits.len()
        );
        if check {
            verify(&run)?;
        }
    }

    Ok(())
}

/// Compare the decoded output against the input sum; returns the number of
/// assignments checked
fn verify(run: &Run) -> Result<usize> {
    let inputs: Vec<Signal> = run
        .ranks
        .iter()
        .flat_map(|r| r.signals().to_vec())
        .collect();

    let assignments: Vec<HashMap<Signal, bool>> = if inputs.len() <= EXHAUSTIVE_LIMIT {
        (0u32..(1 << inputs.len()))
            .map(|pattern| {
                inputs
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (*s, pattern >> i & 1 == 1))
                    .collect()
            })
            .collect()
    } else {
        let mut rng = rand::thread_rng();
        (0..SAMPLED_ASSIGNMENTS)
            .map(|_| inputs.iter().map(|s| (*s, rng.gen_bool(0.5))).collect())
            .collect()
    };

    for assignment in &assignments {
        let check = check_assignment(&run.ranks, &run.netlist, &run.output.bits, assignment)?;
        if !check.passed() {
            bail!("{} tree output is wrong: {}", run.output.stats.reducer, check);
        }
    }

    Ok(assignments.len())
}
