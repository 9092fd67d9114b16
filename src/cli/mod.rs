//! CLI module
//!
//! Subcommands:
//! - `serve`: run the HTTP API server
//! - `ask`: answer a single question from the terminal

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

/// Grounded QA - self-validating question answering
#[derive(Parser)]
#[command(name = "grounded-qa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single question and print the envelope as JSON
    Ask(ask::AskArgs),
}
