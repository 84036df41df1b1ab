// Main entry point for the airport-ads CLI
// Connects to the cluster, makes sure the schema exists, then runs the
// interactive menu on stdin/stdout.

use airport_ads::{menu, AppContext, CassandraStore, Config};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = init_logging(&config.log_file) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => {
            info!("Goodbye");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Send log events to `path` (appending), filtered by RUST_LOG (default: info)
/// Stdout belongs to the menu, so nothing is logged there.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn run(config: &Config) -> Result<()> {
    // The store (and with it the connection) is dropped when this returns,
    // whether the menu ended normally or with an error
    let store = CassandraStore::connect(config)?;
    let mut app = AppContext::from_config(store, config);
    app.ensure_schema()?;

    println!("╔════════════════════════════════════════════╗");
    println!("║          Airport Passengers & Ads          ║");
    println!("╚════════════════════════════════════════════╝");
    println!("Keyspace: {}", app.keyspace());
    println!();

    let stdin = io::stdin();
    let stdout = io::stdout();
    menu::run(&app, &mut stdin.lock(), &mut stdout.lock())
}
