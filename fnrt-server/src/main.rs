//! fnrt Server Binary
//!
//! Bootstrap runtime sitting between the platform's invocation transport
//! and the user's handler process.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use fnrt_config::{ConfigLoader, RuntimeConfig};
use fnrt_logging::init_logging;
use fnrt_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML); environment variables still apply on top
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listener port, overriding PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the resolved configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new().load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(&config.logging)?;

    Server::new(config).start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.server.port = port;
    }
}
