// src/main.rs

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use catalogdeck::cli::{self, Cli};

fn main() {
    // .env is optional; real deployments set the variables directly.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli::run(cli) {
        error!("{}", err);
        std::process::exit(1);
    }
}
