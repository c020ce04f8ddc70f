mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stack")]
#[command(
    about = "Compile stage configurations into container service deployment plans",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: discovered from the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a stage into a deployment plan
    Plan {
        /// Stage name (dev, preview, prod)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, STACKFLOW_STAGE env var)
        #[arg(
            short = 's',
            long = "stage",
            env = "STACKFLOW_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
        /// Build revision, required for preview stages
        #[arg(short, long, env = "APP_REVISION")]
        revision: Option<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
        /// Write the JSON plan to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate and normalize a stage without building the plan
    Validate {
        /// Stage name (dev, preview, prod)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, STACKFLOW_STAGE env var)
        #[arg(
            short = 's',
            long = "stage",
            env = "STACKFLOW_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
        /// Build revision, required for preview stages
        #[arg(short, long, env = "APP_REVISION")]
        revision: Option<String>,
    },
    /// Manage cached lookups of existing networks and hosted zones
    #[command(subcommand)]
    Context(ContextCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ContextCommands {
    /// Record an existing network
    AddNetwork {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Subnet for tasks (repeatable)
        #[arg(long = "private-subnet")]
        private_subnets: Vec<String>,
        /// Subnet for the load balancer (repeatable)
        #[arg(long = "public-subnet")]
        public_subnets: Vec<String>,
    },
    /// Forget a network
    RemoveNetwork { id: String },
    /// Record an existing hosted zone
    AddZone { domain: String, zone_id: String },
    /// Show the cached context
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Context(cmd) => {
            let store = utils::context_store(cli.config.as_deref());
            match cmd {
                ContextCommands::AddNetwork {
                    id,
                    name,
                    private_subnets,
                    public_subnets,
                } => {
                    commands::context::add_network(
                        &store,
                        id,
                        name,
                        private_subnets,
                        public_subnets,
                    )
                    .await?;
                }
                ContextCommands::RemoveNetwork { id } => {
                    commands::context::remove_network(&store, &id).await?;
                }
                ContextCommands::AddZone { domain, zone_id } => {
                    commands::context::add_zone(&store, domain, zone_id).await?;
                }
                ContextCommands::Show => {
                    commands::context::show(&store).await?;
                }
            }
        }
        Commands::Plan {
            stage,
            stage_flag,
            revision,
            json,
            output,
        } => {
            let (config_path, config) = utils::load_config(cli.config.as_deref())?;
            let stage = utils::determine_stage_name(stage.or(stage_flag), &config)?;
            commands::plan::handle(&config_path, &config, stage, revision, json, output).await?;
        }
        Commands::Validate {
            stage,
            stage_flag,
            revision,
        } => {
            let (config_path, config) = utils::load_config(cli.config.as_deref())?;
            let stage = utils::determine_stage_name(stage.or(stage_flag), &config)?;
            commands::validate::handle(&config_path, &config, stage, revision)?;
        }
    }

    Ok(())
}
