#![doc = include_str!("../README.md")]

use anchor_spv_client::{call, fetch, header, verify};
use clap::{command, Parser, Subcommand};
use tracing::{error, info, subscriber::set_global_default};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Logging level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    /// Fetch a transaction inclusion proof from a Bitcoin node
    Fetch(fetch::FetchArgs),
    /// Validate a proof file and display the proven transaction
    Verify(verify::VerifyArgs),
    /// Decode a raw 80-byte block header
    Header(header::HeaderArgs),
    /// Wrap a proof into a `validateTxProof` contract call
    Call(call::CallArgs),
}

fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber_builder =
        tracing_subscriber::fmt::Subscriber::builder().with_env_filter(env_filter);

    let subscriber = subscriber_builder.with_writer(std::io::stderr).finish();
    set_global_default(subscriber).expect("Failed to set subscriber");
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let res = match cli.command {
        Commands::Fetch(args) => fetch::run(args).await,
        Commands::Verify(args) => verify::run(args).await,
        Commands::Header(args) => header::run(args).await,
        Commands::Call(args) => call::run(args).await,
    };

    match res {
        Ok(_) => {
            info!("SPV client has exited without errors");
            std::process::exit(0);
        }
        Err(err) => {
            error!("SPV client has exited with error: {:#}", err);
            std::process::exit(1);
        }
    }
}
