//! CLI argument definitions.
//!
//! All `clap` structures live here so `main.rs` stays focused on dispatching
//! subcommands, the way `openintent-cli::cli` separates argument parsing
//! from subcommand bodies.

use clap::{Parser, Subcommand};

/// dispatchd -- coordinator for `map(f, inputs)` over remote workers.
#[derive(Parser)]
#[command(
    name = "dispatchd",
    version,
    about = "Distributed map coordinator",
    long_about = "Distributes a pure function over a list of inputs to a dynamic pool \
                  of remote workers connected over a WebSocket channel."
)]
pub struct Cli {
    /// Path to a `dispatchd.toml` configuration file.
    #[arg(long, global = true, default_value = "dispatchd.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a self-contained demo session: start a coordinator, spawn an
    /// in-process worker stub, and map `square` over `0..n`.
    Demo {
        /// Number of inputs to map over.
        #[arg(long, default_value_t = 20)]
        n: u32,

        /// Maximum tasks handed to a worker per dispatch decision.
        #[arg(long, default_value_t = 4)]
        chunk_size: usize,

        /// Number of in-process worker stubs to spawn.
        #[arg(long, default_value_t = 1)]
        workers: u32,
    },

    /// Print the resolved configuration and exit.
    Config,
}
