//! bft-sync CLI
//!
//! A command-line interface for running the block synchronization engine.

use bft_sync::cli::{cmd_init, cmd_serve, cmd_status, cmd_sync};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bft-sync")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A BFT blockchain block synchronization engine", long_about = None)]
struct Cli {
    /// Data directory for chain storage and config
    #[arg(short, long, default_value = ".bft_sync_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh chain store and default config
    Init,

    /// Sync the local chain up to a target height and exit
    Sync {
        /// Target height to sync to
        #[arg(short, long)]
        target: u64,
    },

    /// Run a long-lived node: accept peers, chase the network tip, serve the status API
    Serve,

    /// Print the persisted chain's current height
    Status,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => cmd_init(cli.data_dir),
        Commands::Sync { target } => cmd_sync(cli.data_dir, target).await,
        Commands::Serve => cmd_serve(cli.data_dir).await,
        Commands::Status => cmd_status(cli.data_dir),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
