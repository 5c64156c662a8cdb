use std::any::Any;
use std::path::Path;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::Result;
use snarkbench::host::HostInfo;
use snarkbench::{run_benchmark, run_sweep, BackendSelection, BenchConfig, CircuitKind};
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{self, fmt::format::FmtSpan, prelude::*, EnvFilter};

const TRACE_DIR: &str = "benchmark-runs/perfetto_traces";
const RESULTS_DIR: &str = "benchmark-runs/results";

/// Groth16 benchmark over BN254: compile, setup, then prove and verify on
/// the reference and accelerated backends.
#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Benchmark a single circuit size
    Benchmark(BenchmarkArgs),
    /// Benchmark a range of sizes and report proof size and verify time
    Sweep(SweepArgs),
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    /// Output formats
    #[clap(short, long, value_enum)]
    format: Option<Vec<Format>>,

    /// Circuit to benchmark
    #[clap(long, value_enum, default_value_t = CircuitKind::PowerChain)]
    circuit: CircuitKind,

    /// Backends to prove with
    #[clap(short, long, value_enum, default_value_t = BackendSelection::Both)]
    backend: BackendSelection,

    /// Per-phase timing and memory reports on the last prove of each backend
    #[clap(long)]
    profile: bool,

    /// Private input as a decimal integer
    #[clap(long, default_value = "42188824287")]
    x: String,

    /// Public output. Computed from x when not supplied
    #[clap(long)]
    y: Option<String>,

    /// Proofs per backend
    #[clap(long, default_value_t = 2)]
    runs: usize,

    /// Prove on both backends at the same time
    #[clap(long)]
    concurrent: bool,

    /// Wall-clock limit per stage, in seconds
    #[clap(long)]
    budget_secs: Option<f64>,
}

#[derive(Args, Debug)]
struct BenchmarkArgs {
    #[clap(flatten)]
    profile_args: ProfileArgs,

    /// Circuit size as 2^exponent multiplications
    #[clap(short, long, default_value_t = 24)]
    exponent: usize,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[clap(flatten)]
    profile_args: ProfileArgs,

    /// Smallest exponent
    #[clap(long, default_value_t = 10)]
    from: usize,

    /// Largest exponent
    #[clap(long, default_value_t = 20)]
    to: usize,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum Format {
    Default,
    Chrome,
}

impl ProfileArgs {
    fn config(&self, exponent: usize) -> BenchConfig {
        BenchConfig {
            circuit: self.circuit,
            exponent,
            backends: self.backend,
            profile: self.profile,
            x: self.x.clone(),
            y: self.y.clone(),
            prove_runs: self.runs,
            concurrent: self.concurrent,
            budget: self.budget_secs.map(Duration::from_secs_f64),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Benchmark(args) => benchmark(args),
        Commands::Sweep(args) => sweep(args),
    }
}

fn trace(args: &ProfileArgs, trace_file: String) -> Vec<Box<dyn Any>> {
    let mut layers = Vec::new();

    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(log_filter)
        .boxed();
    layers.push(log_layer);

    let mut guards: Vec<Box<dyn Any>> = vec![];

    if let Some(format) = &args.format {
        if format.contains(&Format::Default) {
            let collector_layer = tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .boxed();
            layers.push(collector_layer);
        }
        if format.contains(&Format::Chrome) {
            if let Err(e) = std::fs::create_dir_all(TRACE_DIR) {
                eprintln!("Warning: Failed to create {TRACE_DIR} directory: {e}");
            }
            let (chrome_layer, guard) = ChromeLayerBuilder::new()
                .file(&trace_file)
                .include_args(true)
                .build();
            layers.push(chrome_layer.boxed());
            guards.push(Box::new(guard));
        }
    }

    tracing_subscriber::registry().with(layers).init();
    if guards.is_empty() {
        return guards;
    }
    tracing::info!("Running tracing-chrome. Trace will be saved as {trace_file} and can be viewed in https://ui.perfetto.dev/");
    guards
}

fn benchmark(args: BenchmarkArgs) -> Result<()> {
    let config = args.profile_args.config(args.exponent);
    let _guards = trace(
        &args.profile_args,
        format!("{TRACE_DIR}/{}.json", config.bench_name()),
    );
    HostInfo::collect().log();

    let report = run_benchmark(&config)?;
    report.log_summary();
    if let Err(e) = report.write_csv(Path::new(RESULTS_DIR)) {
        tracing::warn!("Failed to write results to {RESULTS_DIR}: {e}");
    }
    Ok(())
}

fn sweep(args: SweepArgs) -> Result<()> {
    let config = args.profile_args.config(args.from);
    let _guards = trace(
        &args.profile_args,
        format!(
            "{TRACE_DIR}/{}_sweep_{}_{}.json",
            config.circuit.name(),
            args.from,
            args.to
        ),
    );
    HostInfo::collect().log();

    let reports = run_sweep(&config, args.from..=args.to)?;
    for report in &reports {
        report.log_summary();
        if let Err(e) = report.write_csv(Path::new(RESULTS_DIR)) {
            tracing::warn!("Failed to write results to {RESULTS_DIR}: {e}");
        }
    }
    Ok(())
}
