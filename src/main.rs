use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vdbbench::cli::{render, Cli};
use vdbbench::config::Config;
use vdbbench::error::BenchError;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        let code = e
            .downcast_ref::<BenchError>()
            .map_or(1, BenchError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> anyhow::Result<()> {
    // Load .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load config first (needed for logging setup)
    let config = Config::load(cli.common.config.as_deref()).context("failed to load config")?;

    // Initialize tracing from LoggingConfig; stdout is reserved for the payloads
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let rendered = render(&cli, &config)?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}
