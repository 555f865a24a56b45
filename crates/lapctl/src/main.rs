//! lapctl - operate a lap store image from the shell
//!
//! Subcommands:
//! - `lapctl init` - Clear the store (creating the image if needed)
//! - `lapctl record <time>...` - Record a whole session
//! - `lapctl new-session` / `add` / `end` - Step-by-step recording
//! - `lapctl totals` / `sessions` / `summary <n>` / `show <n>` - Inspect

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lapstore::LapTime;

mod commands;

#[derive(Parser)]
#[command(name = "lapctl")]
#[command(about = "Record and inspect lap timing sessions in a lap store image")]
#[command(version)]
struct Cli {
    /// TOML config file with a [lapstore] section
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Image file (overrides config and LAPTIMER_IMAGE_PATH)
    #[arg(short, long, global = true)]
    image: Option<PathBuf>,

    /// Slot count (overrides config and LAPTIMER_CAPACITY)
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clear every slot, creating the image if it doesn't exist
    Init,

    /// Print the handle where a new session would start
    NewSession,

    /// Write a lap time at a handle
    Add {
        /// Slot handle
        handle: u16,

        /// Lap time as m:ss.dd, ss.dd or hundredths
        time: LapTime,
    },

    /// Write the end-of-session marker at a handle
    End {
        /// Slot handle
        handle: u16,
    },

    /// Record a complete session
    Record {
        /// Lap times as m:ss.dd, ss.dd or hundredths
        #[arg(required = true)]
        times: Vec<LapTime>,
    },

    /// Show session count, laps recorded and laps remaining
    Totals,

    /// List every session with its summary
    Sessions,

    /// Summarize one session
    Summary {
        /// Session number, from 0
        session: usize,
    },

    /// List the laps of one session
    Show {
        /// Session number, from 0
        session: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::resolve_config(cli.config.as_deref(), cli.image, cli.capacity)?;
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Init => commands::init(&config, output)?,
        Commands::NewSession => commands::new_session(&config, output)?,
        Commands::Add { handle, time } => commands::add(&config, output, handle, time)?,
        Commands::End { handle } => commands::end(&config, output, handle)?,
        Commands::Record { times } => commands::record(&config, output, &times)?,
        Commands::Totals => commands::totals(&config, output)?,
        Commands::Sessions => commands::sessions(&config, output)?,
        Commands::Summary { session } => commands::summary(&config, output, session)?,
        Commands::Show { session } => commands::show(&config, output, session)?,
    }

    Ok(())
}
