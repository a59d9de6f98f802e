//! Bastion CLI - play, simulate and inspect Bastion games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Bastion - a two-player castle board game
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively in the terminal
    Play {
        /// Who sits in each seat
        #[arg(short, long, default_value = "pvai")]
        mode: cli::ModeArg,

        /// Game configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board width
        #[arg(long)]
        width: Option<u16>,

        /// Board height
        #[arg(long)]
        height: Option<u16>,

        /// Delay between opponent actions in milliseconds
        #[arg(long)]
        speed: Option<u64>,

        /// Resume from a snapshot instead of starting fresh
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Run a headless match between two scripted opponents
    Run {
        /// Game configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum turns before the match is a draw
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final state as a snapshot
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress the final board
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print a saved snapshot
    Show {
        /// Snapshot file (.json)
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Print the line-oriented summary instead of the board
        #[arg(short, long)]
        summary: bool,

        /// Disable ANSI colors
        #[arg(long)]
        plain: bool,
    },

    /// Check a configuration file
    Validate {
        /// Configuration file to check
        #[arg(required = true)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Play {
            mode,
            config,
            width,
            height,
            speed,
            resume,
        } => cli::play::execute(mode, config, width, height, speed, resume),

        Commands::Run {
            config,
            max_turns,
            format,
            save,
            quiet,
        } => cli::run::execute(config, max_turns, format, save, quiet),

        Commands::Show {
            snapshot,
            summary,
            plain,
        } => cli::show::execute(&snapshot, summary, plain),

        Commands::Validate { config } => cli::validate::execute(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
