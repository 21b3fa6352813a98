//! CO-PRESENCE CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a default `copresence.toml`
//! - `run`: Run simulation cycles
//! - `status`: Show data directory status
//! - `log`: Query the artifact log
//! - `summary`: Summarize the log without running

use clap::{Parser, Subcommand, ValueEnum};
use copresence_core::artifact::ArtifactKind;
use copresence_core::query::SortOrder;
use std::path::PathBuf;

mod commands;
mod display;

#[derive(Parser)]
#[command(
    name = "copresence",
    about = "CO-PRESENCE: two agents, one shared log",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./copresence.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run simulation cycles
    Run {
        /// Number of cycles (default: run.default_cycles)
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Skip per-cycle artifact files
        #[arg(long)]
        no_save: bool,

        /// Seed for perturbation scheduling and sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show data directory status
    Status,

    /// Query the artifact log
    Log {
        /// Only artifacts from this agent
        #[arg(short, long)]
        agent: Option<String>,

        /// Only artifacts of this category
        #[arg(short, long)]
        kind: Option<ArtifactKind>,

        /// Maximum number of artifacts shown
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(long, value_enum, default_value_t = Order::Desc)]
        order: Order,
    },

    /// Summarize the log without running
    Summary,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { force } => commands::init::run(config_path, force)?,
        Commands::Run {
            cycles,
            model,
            no_save,
            seed,
        } => {
            let options = commands::run::RunOptions {
                cycles,
                model,
                no_save,
                seed,
            };
            commands::run::run(config_path, options).await?
        }
        Commands::Status => commands::status::run(config_path)?,
        Commands::Log {
            agent,
            kind,
            limit,
            order,
        } => commands::log::run(config_path, agent, kind, limit, order.into())?,
        Commands::Summary => commands::summary::run(config_path)?,
    }

    Ok(())
}
