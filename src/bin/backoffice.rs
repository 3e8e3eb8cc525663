mod commands;

use catalog_backoffice::{AppStateStore, ClientConfig};
use clap::Parser;
use commands::{execute_command, utils::build_client, Commands};
use std::path::PathBuf;

/// Back office for the music catalog
#[derive(Parser)]
#[command(
    name = "backoffice",
    about = "Manage the music catalog and watch backend metrics",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// API base URL (overrides BACKOFFICE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory for the saved session and preferences (overrides BACKOFFICE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let store = match AppStateStore::from_config(&config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Cannot locate the data directory: {e}");
            eprintln!("   Set BACKOFFICE_DATA_DIR or pass --data-dir");
            std::process::exit(1);
        }
    };
    log::debug!("Using data directory {}", store.dir().display());

    let client = build_client(config, &store);
    if args.verbose {
        println!("🔍 Verbose mode enabled, talking to {}", client.base_url());
    }

    if let Err(e) = execute_command(args.command, &client, &store).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
