use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cloudscape_core::analysis::constants::DEFAULT_SEQUENTIAL_CUTOFF;
use cloudscape_core::classifier::constants::STRATUS_WIND_THRESHOLD;
use cloudscape_core::io::{read_grid, write_grid, write_output};
use cloudscape_core::validate::{read_reference, DEFAULT_WIND_EPSILON};
use cloudscape_core::{
    benchmark_cutoffs, compare, AnalysisConfig, CloudAnalysis, CloudGrid, GridDims,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Cloud type classification and prevailing wind over a time-evolving grid
#[derive(Parser, Debug)]
#[command(name = "cloudscape")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify an input grid and write the output file
    Run(RunArgs),
    /// Time the sequential baseline against a range of cutoffs
    Bench(BenchArgs),
    /// Write a random grid in input format
    Generate(GenerateArgs),
}

/// Traversal options shared by `run` and `bench`
#[derive(Args, Debug)]
struct PassArgs {
    /// Range length below which tasks stop splitting
    #[arg(short, long, default_value_t = DEFAULT_SEQUENTIAL_CUTOFF)]
    cutoff: usize,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Sum advection in its own pass instead of during classification
    #[arg(long)]
    separate_passes: bool,

    /// Minimum local wind speed for striated stratus
    #[arg(long, default_value_t = STRATUS_WIND_THRESHOLD)]
    threshold: f64,
}

impl PassArgs {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            cutoff: self.cutoff,
            fused: !self.separate_passes,
            threads: self.threads,
            stratus_threshold: self.threshold,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input grid file
    input: PathBuf,

    /// Output classification file
    output: PathBuf,

    /// Reference output to validate against
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Tolerance for prevailing wind components when validating
    #[arg(long, default_value_t = DEFAULT_WIND_EPSILON)]
    epsilon: f64,

    #[command(flatten)]
    pass: PassArgs,
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Input grid file
    #[arg(required_unless_present = "synthetic")]
    input: Option<PathBuf>,

    /// Benchmark a random grid of the given size instead, e.g. 10x512x512
    #[arg(long, value_parser = parse_dims, conflicts_with = "input")]
    synthetic: Option<GridDims>,

    /// Seed for the random grid
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Cutoffs to time
    #[arg(long, value_delimiter = ',', default_values_t = [500, 1000, 2000, 5000, 20000])]
    cutoffs: Vec<usize>,

    /// Runs per configuration
    #[arg(short, long, default_value_t = 5)]
    repeats: usize,

    #[command(flatten)]
    pass: PassArgs,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Destination file
    output: PathBuf,

    /// Grid size as TxXxY
    #[arg(long, value_parser = parse_dims)]
    dims: GridDims,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn parse_dims(s: &str) -> std::result::Result<GridDims, String> {
    let parts: Vec<&str> = s.split(['x', 'X']).collect();
    let [t, x, y] = parts.as_slice() else {
        return Err(format!("expected TxXxY, got `{s}`"));
    };
    fn axis(v: &str) -> std::result::Result<usize, String> {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("bad dimension `{v}`: {e}"))
    }
    GridDims::new(axis(t)?, axis(x)?, axis(y)?).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Run(args) => run(&args),
        Command::Bench(args) => bench(&args),
        Command::Generate(args) => generate(&args),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let analysis = CloudAnalysis::new(args.pass.config())?;

    let mut grid = read_grid(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    info!(dims = %grid.dims(), "grid loaded");

    let report = analysis.run(&mut grid)?;
    println!(
        "Prevailing wind: ({:.6}, {:.6}) over {} points in {:.3} ms ({} splits)",
        report.prevailing_wind.x,
        report.prevailing_wind.y,
        report.points,
        report.elapsed.as_secs_f64() * 1000.0,
        report.splits.unwrap_or(0)
    );

    write_output(&args.output, &grid, report.prevailing_wind)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if let Some(path) = &args.reference {
        let reference = read_reference(path)
            .with_context(|| format!("failed to load reference {}", path.display()))?;
        let validation = compare(&grid, report.prevailing_wind, &reference, args.epsilon);
        if !validation.is_correct() {
            bail!(
                "output does not match reference: dims {}, wind error {:.3e}, {} mismatched points",
                if validation.dims_match { "match" } else { "differ" },
                validation.wind_error,
                validation.mismatched_points
            );
        }
        println!("Output is correct");
    }

    Ok(())
}

fn bench(args: &BenchArgs) -> Result<()> {
    let mut grid = match (&args.input, args.synthetic) {
        (Some(path), _) => read_grid(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, Some(dims)) => CloudGrid::random(dims, &mut StdRng::seed_from_u64(args.seed)),
        (None, None) => bail!("provide an input file or --synthetic TxXxY"),
    };
    if args.cutoffs.is_empty() {
        warn!("no cutoffs given, timing the sequential baseline only");
    }

    println!(
        "Benchmarking {} grid ({} points), {} repeats",
        grid.dims(),
        grid.dim(),
        args.repeats
    );
    let samples = benchmark_cutoffs(&mut grid, &args.pass.config(), &args.cutoffs, args.repeats)?;

    println!(
        "{:<16} {:>12} {:>12} {:>10}",
        "config", "best (ms)", "mean (ms)", "splits"
    );
    for sample in &samples {
        let splits = sample
            .splits
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "{:<16} {:>12.3} {:>12.3} {:>10}",
            sample.label,
            sample.best.as_secs_f64() * 1000.0,
            sample.mean.as_secs_f64() * 1000.0,
            splits
        );
    }

    Ok(())
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let grid = CloudGrid::random(args.dims, &mut StdRng::seed_from_u64(args.seed));
    write_grid(&args.output, &grid)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Wrote {} grid to {}", grid.dims(), args.output.display());
    Ok(())
}
