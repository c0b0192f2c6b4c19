//! CLI entry point for the dispatch coordinator.
//!
//! Provides the `dispatchd` command: a `demo` subcommand that runs a real
//! coordinator session end to end against in-process worker stubs, and a
//! `config` subcommand that prints the resolved configuration.

mod cli;
mod demo_worker;
mod helpers;

use anyhow::{Context, Result};
use clap::Parser;
use dispatch_codec::{Codec, JsonCodec};
use dispatch_coordinator::{Coordinator, SessionConfig};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::helpers::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { n, chunk_size, workers } => cmd_demo(&cli.config, n, chunk_size, workers).await,
        Commands::Config => cmd_config(&cli.config),
    }
}

async fn cmd_demo(config_path: &str, n: u32, chunk_size: usize, workers: u32) -> Result<()> {
    init_tracing("info");

    let config = SessionConfig::from_file(config_path).context("failed to load configuration")?;
    let coordinator = Coordinator::new(config.clone());

    let mut progress = coordinator.progress().subscribe();
    let progress_task = tokio::spawn(async move {
        while let Ok(update) = progress.recv().await {
            info!(completed = update.completed, total = update.total, "progress");
        }
    });

    let addr = config.transport.transport_addr();
    let mut worker_handles = Vec::new();
    for i in 0..workers {
        let addr = addr.clone();
        worker_handles.push(tokio::spawn(async move {
            demo_worker::run_squaring_worker(&addr, &format!("worker-{i}")).await
        }));
    }
    // Give the transport listener a moment to bind before workers dial in.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let f_blob = JsonCodec.encode(&"square")?;
    let inputs: Vec<i32> = (0..n as i32).collect();

    info!(n, chunk_size, workers, "starting demo session");
    let results: Vec<i32> = coordinator.map(f_blob, inputs, chunk_size).await?;

    for handle in worker_handles {
        handle.abort();
    }
    progress_task.abort();

    println!("{results:?}");
    Ok(())
}

fn cmd_config(config_path: &str) -> Result<()> {
    let config = SessionConfig::from_file(config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
