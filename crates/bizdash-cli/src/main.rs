mod catalog;
mod render;

use std::path::PathBuf;

use bizdash_core::SortKey;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bizdash-cli")]
#[command(about = "Browse and maintain collected business listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List businesses matching a filter
    List {
        /// Data file path or `http(s)://` endpoint (defaults to `BIZDASH_SOURCE`, then `BIZDASH_DATA_PATH`)
        #[arg(long)]
        source: Option<String>,
        /// Case-insensitive substring matched against name and type
        #[arg(long, default_value = "")]
        filter: String,
        /// Ordering: name, type, date, or none
        #[arg(long, default_value = "none")]
        sort: SortKey,
    },
    /// Show the full detail of one business
    Show {
        /// Business id as printed by `list`
        id: String,
        #[arg(long)]
        source: Option<String>,
    },
    /// Merge a newly collected batch into the data file, skipping duplicates
    Import {
        /// JSON file holding the new batch
        file: PathBuf,
        /// Data file to merge into (defaults to `BIZDASH_DATA_PATH`)
        #[arg(long)]
        into: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bizdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi_logs())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List {
            source,
            filter,
            sort,
        } => catalog::run_list(&config, source.as_deref(), &filter, sort).await?,
        Commands::Show { id, source } => {
            catalog::run_show(&config, source.as_deref(), &id).await?;
        }
        Commands::Import { file, into } => {
            let into = into.unwrap_or_else(|| config.data_path.clone());
            catalog::run_import(&file, &into).await?;
        }
    }

    Ok(())
}
