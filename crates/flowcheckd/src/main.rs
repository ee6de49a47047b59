//! flowcheckd entry point.
//!
//! Parses the CLI surface, loads the topology file, wires the
//! controller client and switch backends, and runs the requested
//! validation. Findings print as `ERROR:` lines; the exit code is the
//! overall pass/fail.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;

use flowcheck_odl::OdlClient;
use flowcheck_topology::{Report, Topology, TopologyConfig};
use flowcheckd::{Auditor, DeviceManager};

/// OpenFlow fabric state validator for OpenDaylight clusters
#[derive(Parser, Debug)]
#[command(name = "flowcheckd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Topology description file (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "error")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate switch presence in the controller's topology views
    Nodes {
        /// Expect switches to be absent instead of present
        #[arg(long)]
        expect_down: bool,
        /// Skip the segment-routing topology
        #[arg(long)]
        skip_sr: bool,
    },
    /// Validate link peers in the controller's topology views
    Links {
        /// Expect links to be absent instead of present
        #[arg(long)]
        expect_down: bool,
        /// Skip the segment-routing topology
        #[arg(long)]
        skip_sr: bool,
    },
    /// Validate groups and flows across controller, switches and
    /// calculated paths
    Elements {
        /// Also require live packet and byte counters
        #[arg(long)]
        check_stats: bool,
    },
    /// Validate cluster ownership against switch-side roles
    Roles,
    /// Run every validation in sequence
    All {
        /// Also require live packet and byte counters
        #[arg(long)]
        check_stats: bool,
    },
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

fn print_report(name: &str, report: &Report) {
    for finding in report.findings() {
        println!("ERROR: {finding}");
    }
    if report.passed() {
        println!(
            "OK: {name}: {} entities validated",
            report.entities_checked()
        );
    } else {
        println!(
            "FAILED: {name}: {} findings over {} entities",
            report.findings().len(),
            report.entities_checked()
        );
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = TopologyConfig::load(&cli.config)
        .with_context(|| format!("loading topology file {}", cli.config.display()))?;
    let topology = Topology::from_config(&config);
    let controller = topology.default_controller().clone();
    info!(
        controller = %controller.name,
        switches = topology.switch_count(),
        "topology loaded"
    );

    let client = OdlClient::connect(&controller).context("building controller client")?;
    let devices = DeviceManager::from_config(&config);
    let mut auditor = Auditor::new(topology, client, devices);

    let passed = match cli.command {
        Command::Nodes {
            expect_down,
            skip_sr,
        } => {
            let report = auditor.validate_nodes(!expect_down, !skip_sr).await;
            print_report("nodes", &report);
            report.passed()
        }
        Command::Links {
            expect_down,
            skip_sr,
        } => {
            let report = auditor.validate_links(!expect_down, !skip_sr).await;
            print_report("links", &report);
            report.passed()
        }
        Command::Elements { check_stats } => {
            let report = auditor.validate_openflow_elements(check_stats).await;
            print_report("openflow elements", &report);
            report.passed()
        }
        Command::Roles => {
            let report = auditor.validate_node_roles().await;
            print_report("node roles", &report);
            report.passed()
        }
        Command::All { check_stats } => {
            let nodes = auditor.validate_nodes(true, true).await;
            print_report("nodes", &nodes);
            let links = auditor.validate_links(true, true).await;
            print_report("links", &links);
            let elements = auditor.validate_openflow_elements(check_stats).await;
            print_report("openflow elements", &elements);
            let roles = auditor.validate_node_roles().await;
            print_report("node roles", &roles);
            nodes.passed() && links.passed() && elements.passed() && roles.passed()
        }
    };
    Ok(passed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
