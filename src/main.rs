use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use validator::Validate;

use spin_anneal::config::{EngineMode, GeneratorKind, RunConfig};
use spin_anneal::output::{group_energies, write_report};
use spin_anneal::schedule::{build_schedule, ScheduleKind};
use spin_anneal::topology::Topology;

/// Simulated-annealing solver for Ising spin glasses.
///
/// Reads a coupling list, anneals many independent replicas along an
/// inverse-temperature schedule and reports the final-energy histogram.
#[derive(Debug, Parser)]
#[command(name = "spin-anneal", version, about)]
struct Cli {
    /// Lattice file: one header line, then `site0 site1 value` rows
    /// (a row with site0 == site1 sets an on-site field)
    #[arg(short = 'l', long = "lattice")]
    lattice: PathBuf,

    /// Number of sweeps (required for linear/exponential schedules)
    #[arg(short = 's', long = "sweeps")]
    sweeps: Option<usize>,

    /// Number of repetitions; the packed engine runs 64 replicas per
    /// repetition
    #[arg(short = 'r', long = "reps", default_value_t = 1)]
    reps: usize,

    /// First repetition index, for splitting an experiment across
    /// invocations without replaying seeds
    #[arg(long = "rep0", default_value_t = 0)]
    rep0: usize,

    /// Initial inverse temperature
    #[arg(long = "beta0", default_value_t = 0.1)]
    beta0: f64,

    /// Final inverse temperature
    #[arg(long = "beta1", default_value_t = 3.0)]
    beta1: f64,

    /// Schedule: 'linear', 'exponential', or a path to a file with one
    /// beta per line
    #[arg(long = "sched", default_value = "linear")]
    sched: String,

    /// Update engine: 'packed' (64 bit-coded replicas per word) or 'scalar'
    #[arg(short = 'm', long = "mode", default_value = "packed")]
    mode: String,

    /// Fast generator for acceptance draws: 'lincon' or 'lagfib'
    #[arg(long = "gen", default_value = "lincon")]
    generator: String,

    /// Worker threads (default: one per core)
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Report only the lowest energy level found
    #[arg(short = 'g', long = "lowest")]
    lowest: bool,

    /// Print engine details and phase timings
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mode = EngineMode::try_from(cli.mode.as_str()).map_err(anyhow::Error::msg)?;
    let generator = GeneratorKind::try_from(cli.generator.as_str()).map_err(anyhow::Error::msg)?;
    let config = RunConfig {
        n_reps: cli.reps,
        rep0: cli.rep0,
        n_threads: cli.threads,
        mode,
        generator,
    };
    config.validate().context("invalid run configuration")?;

    let kind = ScheduleKind::from(cli.sched.as_str());
    let n_sweeps = match (&kind, cli.sweeps) {
        (ScheduleKind::File(_), n) => n.unwrap_or(0),
        (_, Some(n)) => n,
        (_, None) => bail!("--sweeps is required for '{}' schedules", cli.sched),
    };

    if let Some(threads) = config.n_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("cannot configure thread pool")?;
    }

    let t0 = Instant::now();
    let topology = Topology::from_file(&cli.lattice)?;
    let schedule = build_schedule(&kind, n_sweeps, cli.beta0, cli.beta1)?;
    if cli.verbose {
        info!(
            sites = topology.n_sites(),
            sweeps = schedule.len(),
            reps = config.n_reps,
            "inputs loaded in {:.3}s",
            t0.elapsed().as_secs_f64()
        );
    }

    let bar = if cli.verbose {
        let bar = ProgressBar::new(config.n_reps as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} reps [{elapsed_precise}]")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let t1 = Instant::now();
    let result = spin_anneal::run(&topology, &schedule, &config, &|| bar.inc(1))?;
    bar.finish_and_clear();
    if cli.verbose {
        info!(
            "{}; {} replicas annealed in {:.3}s",
            result.engine_info,
            result.energies.len(),
            t1.elapsed().as_secs_f64()
        );
    }

    let groups = group_energies(&result.energies);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &groups, topology.source(), cli.lowest)?;
    out.flush()?;

    Ok(())
}
