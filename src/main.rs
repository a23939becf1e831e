mod commands;
mod config;
mod diagnostics;
mod error;
mod host;
mod index;
mod paths;
mod ranker;
mod resolver;
mod scanner;
mod toggle;
mod types;
mod watch;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Exit code for errors surfaced to the user.
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "toggler", about = "Toggle between C/C++ source and header companions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Workspace folder to index (repeatable). Overrides `roots` in .toggler.toml
    #[arg(long = "root", global = true, value_name = "DIR")]
    roots: Vec<PathBuf>,
    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every indexed file name with its locations
    Index,
    /// Keep the index live and toggle each path read from stdin
    Session {
        /// Print ambiguous candidates instead of prompting
        #[arg(long)]
        no_prompt: bool,
    },
    /// Open the companion of FILE (.c/.cpp <-> .h)
    Toggle {
        /// The currently active file
        file: PathBuf,
        /// Treat PATH as already open; open documents win over the index (repeatable)
        #[arg(long = "open", value_name = "PATH")]
        open: Vec<PathBuf>,
        /// Print ambiguous candidates instead of prompting
        #[arg(long)]
        no_prompt: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let result = match cli.command {
        Commands::Index => commands::index(&cli.roots),
        Commands::Session { no_prompt } => commands::session(&cli.roots, no_prompt),
        Commands::Toggle { file, open, no_prompt } => commands::toggle(&cli.roots, &file, &open, no_prompt),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(EXIT_ERROR)
        },
    };
}
