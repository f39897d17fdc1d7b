//! EntiMap CLI
//!
//! Command-line tools for inspecting EntiMap models.
//!
//! # Commands
//!
//! - `discover` - Build a model from a JSON description and print what the
//!   conventions inferred
//! - `traverse` - Track an object graph against a model and print the
//!   order in which objects were reached

mod commands;
mod description;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// EntiMap command-line model tools.
#[derive(Parser)]
#[command(name = "entimap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a model and print keys and foreign keys
    Discover {
        /// Path to the JSON model description
        model: PathBuf,

        /// Skip every convention
        #[arg(long)]
        no_conventions: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Track an object graph and print the traversal order
    Traverse {
        /// Path to the JSON model description
        model: PathBuf,

        /// Path to the JSON object graph
        graph: PathBuf,

        /// State assigned to reached objects
        #[arg(short, long, default_value = "added", value_parser = commands::traverse::parse_state)]
        state: entimap_core::EntityState,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Discover {
            model,
            no_conventions,
            format,
        } => {
            commands::discover::run(&model, no_conventions, &format)?;
        }
        Commands::Traverse {
            model,
            graph,
            state,
            format,
        } => {
            commands::traverse::run(&model, &graph, state, &format)?;
        }
        Commands::Version => {
            println!("EntiMap CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("EntiMap Core v{}", entimap_core::VERSION);
        }
    }

    Ok(())
}
