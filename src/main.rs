//! ABSort CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "absort")]
#[command(about = "Order top-level declarations by dependency and similarity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort the declarations of a JSON manifest
    Sort {
        /// Manifest: a JSON array of declarations
        manifest: PathBuf,

        /// TOML config file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// topological, depth-first or breadth-first
        #[arg(short, long)]
        order: Option<String>,

        /// Reverse the output order
        #[arg(long)]
        reverse: bool,

        /// Do not move `main` to the end
        #[arg(long)]
        no_pin_main: bool,

        /// Order classes and functions as separate blocks
        #[arg(long)]
        separate_kinds: bool,

        /// Keep input order among same-rank declarations
        #[arg(long)]
        no_similarity: bool,

        /// Clustering seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the sorted declarations as JSON instead of names
        #[arg(long)]
        json: bool,
    },
    /// List mutually recursive declaration groups
    Cycles {
        manifest: PathBuf,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "absort={0},absort_core={0},absort_graph={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Sort {
            manifest,
            config,
            order,
            reverse,
            no_pin_main,
            separate_kinds,
            no_similarity,
            seed,
            json,
        } => {
            let overrides = commands::Overrides {
                order,
                reverse,
                no_pin_main,
                separate_kinds,
                no_similarity,
                seed,
            };
            commands::sort(&manifest, config.as_deref(), overrides, json)
        }
        Commands::Cycles { manifest } => commands::cycles(&manifest),
        Commands::Version => {
            println!("ABSort v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
