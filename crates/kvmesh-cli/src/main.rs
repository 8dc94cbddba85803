//! kvmesh - launch a local key-value store cluster and benchmark it
//!
//! - `kvmesh launch` starts every node of a topology in its own console
//!   window and tiles the windows on screen
//! - `kvmesh bench` runs POST/GET/DELETE traffic against the nodes and writes
//!   a JSON report

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kvmesh_bench::BenchError;
use kvmesh_core::config::load_json;
use kvmesh_core::{
    BenchConfig, ConfigError, LaunchConfig, NodeSpec, Preset, Topology, TopologyError,
    WorkloadItem,
};
use kvmesh_launcher::{LaunchError, TopologyLauncher};

#[derive(Parser)]
#[command(name = "kvmesh")]
#[command(about = "Launch and benchmark a local key-value store cluster", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start every node of a topology and tile its windows
    Launch(LaunchArgs),
    /// Run the POST/GET/DELETE benchmark and write a report
    Bench(BenchArgs),
}

#[derive(Args)]
struct LaunchArgs {
    /// Built-in topology (default: small)
    #[arg(long, value_enum, conflicts_with_all = ["topology", "node"])]
    preset: Option<PresetArg>,

    /// JSON file holding a list of {"port", "parent_port"} declarations
    #[arg(long, conflicts_with = "node")]
    topology: Option<PathBuf>,

    /// Node declaration, repeatable, in declaration order
    #[arg(long, value_name = "PORT[:PARENT]")]
    node: Vec<NodeSpec>,

    /// Launch configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct BenchArgs {
    /// Benchmark configuration file; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding a list of {"key", "value"} items
    #[arg(long)]
    workload: Option<PathBuf>,

    /// Candidate node port, repeatable
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Vec<u16>,

    /// Seed for node selection
    #[arg(long)]
    seed: Option<u64>,

    /// Pause after every request, e.g. "500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    pacing: Option<Duration>,

    /// Report file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Small,
    Large,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Small => Preset::Small,
            PresetArg::Large => Preset::Large,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Command::Launch(args) => launch(args).await,
        Command::Bench(args) => bench(args).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            error!(exit_code = code, "{:#}", err);
            ExitCode::from(code)
        }
    }
}

/// `RUST_LOG` applies unless `--verbose` asks for debug output
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn launch(args: LaunchArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => LaunchConfig::load(path)?,
        None => LaunchConfig::default(),
    };
    let topology = resolve_topology(&args)?;
    info!(source = topology_source(&args), "Resolved topology");

    let launcher = TopologyLauncher::from_config(&config)?;
    let summary = launcher.launch(&topology).await?;

    if !summary.is_complete() {
        warn!(
            failed = ?summary.failed,
            skipped = ?summary.skipped,
            "Cluster is incomplete"
        );
    }
    Ok(())
}

fn topology_source(args: &LaunchArgs) -> &'static str {
    match (&args.node[..], &args.topology, args.preset) {
        ([_, ..], _, _) => "--node flags",
        (_, Some(_), _) => "topology file",
        (_, _, Some(PresetArg::Large)) => "large preset",
        _ => "small preset",
    }
}

/// `--node` flags, then `--topology`, then the preset
fn resolve_topology(args: &LaunchArgs) -> Result<Topology, ConfigError> {
    if !args.node.is_empty() {
        return Ok(Topology::new(args.node.clone())?);
    }
    if let Some(path) = &args.topology {
        return load_json(path);
    }
    let preset: Preset = args.preset.map(Preset::from).unwrap_or_default();
    Ok(preset.topology()?)
}

async fn bench(args: BenchArgs) -> anyhow::Result<()> {
    let config = bench_config(args)?;
    let report = kvmesh_bench::run_from_config(&config).await?;

    println!(
        "{} requests, {:.2}% success, report at {}",
        report.performance_metrics.total_requests,
        report.performance_metrics.success_rate * 100.0,
        config.output.display()
    );
    Ok(())
}

fn bench_config(args: BenchArgs) -> Result<BenchConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };

    if let Some(path) = &args.workload {
        config.workload = load_json::<Vec<WorkloadItem>>(path)?;
    }
    if !args.port.is_empty() {
        config.ports = args.port;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(pacing) = args.pacing {
        config.pacing = pacing;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    Ok(config)
}

/// 2 invalid input, 3 launch aborted, 4 report not written, 1 anything else
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<LaunchError>() {
        return match err {
            LaunchError::Spawn { .. } => 3,
            err if err.is_validation_error() => 2,
            _ => 1,
        };
    }
    if let Some(err) = err.downcast_ref::<BenchError>() {
        return match err {
            err if err.is_output_error() => 4,
            BenchError::Config(_) | BenchError::NoCandidatePorts => 2,
            _ => 1,
        };
    }
    if err.is::<ConfigError>() || err.is::<TopologyError>() {
        return 2;
    }
    1
}
