//! ocipower CLI - Main Entry Point

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ocipower_cli::commands::{config, instance};
use ocipower_cli::output;
use ocipower_common::ConfigLocation;

/// ocipower - submit compute instance power actions
#[derive(Parser)]
#[command(name = "ocipower")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Credential config file (defaults to ~/.oci/config)
    #[arg(long, env = "OCI_CONFIG_FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Profile within the config file
    #[arg(long, env = "OCI_CLI_PROFILE", global = true)]
    profile: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit instance power actions
    #[command(subcommand)]
    Instance(instance::InstanceCommands),

    /// Inspect the credential config
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the payload
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let location = ConfigLocation::resolve(cli.config_file, cli.profile);

    match cli.command {
        Commands::Instance(cmd) => instance::execute(cmd, &location, cli.format).await?,
        Commands::Config(cmd) => config::execute(cmd, &location, cli.format)?,
        Commands::Version => {
            println!("ocipower v{}", env!("CARGO_PKG_VERSION"));
            println!("Compute API version {}", ocipower_common::API_VERSION);
        }
    }

    Ok(())
}
