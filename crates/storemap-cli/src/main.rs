mod convert;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::state::StateCommands;

#[derive(Debug, Parser)]
#[command(name = "storemap-cli")]
#[command(about = "Store map data tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build GeoJSON from a store table, optionally filtered
    Convert {
        /// Store CSV to read (defaults to the configured data source)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write GeoJSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only stores of this brand
        #[arg(long, default_value = "all")]
        brand: String,
        /// Only stores whose code appears in this allow-list file
        #[arg(long, default_value = "all")]
        codes: String,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List brands with store counts, in order of first appearance
    Brands {
        /// Store CSV to read (defaults to the configured data source)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Inspect or clear persisted viewer state
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = storemap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            brand,
            codes,
            pretty,
        }) => {
            convert::run_convert(
                &config,
                &convert::ConvertArgs {
                    input,
                    output,
                    brand,
                    codes,
                    pretty,
                },
            )
            .await?;
        }
        Some(Commands::Brands { input }) => convert::run_brands(&config, input.as_deref()).await?,
        Some(Commands::State { command }) => state::run_state(&config, &command)?,
        None => println!("storemap-cli: use --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
