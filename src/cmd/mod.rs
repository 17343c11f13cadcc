mod generate;
mod kinds;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate as generate_completions, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "systab-bench")]
#[command(version)]
#[command(
    about = "Generate sysbench scripts over synthetic versioned-database system tables",
    long_about = None
)]
pub struct Cli {
    /// Verbose diagnostics (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one Lua script per definition in a scripts file
    Generate {
        /// YAML scripts file
        file: PathBuf,

        /// Output directory for generated scripts
        #[arg(short, long, default_value = "gen")]
        output: PathBuf,

        /// Only generate the script with this name
        #[arg(short, long)]
        script: Option<String>,

        /// Seed for commit hashes (random if not specified)
        #[arg(long)]
        seed: Option<u64>,

        /// Fixed commit timestamp, RFC 3339 (default: current local time)
        #[arg(long)]
        timestamp: Option<String>,

        /// Write scripts to stdout instead of files
        #[arg(long, conflicts_with = "dry_run")]
        stdout: bool,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Show progress during generation
        #[arg(short, long)]
        progress: bool,
    },

    /// List supported fixture table kinds
    Kinds,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            file,
            output,
            script,
            seed,
            timestamp,
            stdout,
            dry_run,
            progress,
        } => generate::run(generate::GenerateArgs {
            file,
            output,
            script,
            seed,
            timestamp,
            stdout,
            dry_run,
            progress,
        }),
        Commands::Kinds => kinds::run(),
        Commands::Completions { shell } => {
            generate_completions(
                shell,
                &mut Cli::command(),
                "systab-bench",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
