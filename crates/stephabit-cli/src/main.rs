//! `stephabit` CLI — free windows, conflicts, suggestions and guarded block
//! creation over a JSON schedule snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Free windows for user 1 (snapshot on stdin)
//! cat schedule.json | stephabit free --owner 1
//!
//! # Narrower working day
//! stephabit free -i schedule.json --owner 1 --envelope-start 08:00 --envelope-end 18:00
//!
//! # Strict conflict scan
//! stephabit conflicts -i schedule.json --owner 1 --pairwise
//!
//! # Free windows, conflicts and suggestions in one go
//! stephabit --config stephabit.toml plan -i schedule.json --owner 1
//!
//! # Create a block unless it overlaps, writing the updated snapshot
//! stephabit add -i schedule.json -o schedule.json --owner 1 \
//!     --start 2024-01-01T14:00 --duration 30 --title "Call mom"
//! ```
//!
//! A snapshot looks like `{"users": [1], "habits": [...], "blocks": [...]}`;
//! every section is optional.

mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use stephabit_engine::window::{parse_instant, parse_time_of_day};
use stephabit_engine::{
    CandidateKind, ConflictMode, DayEnvelope, EngineConfig, MemoryStore, NewBlock, Repeat,
    ScheduleService, Snapshot,
};
use tracing_subscriber::EnvFilter;

use crate::view::{BlockView, ConflictView, FreeWindowView, PlanView, SuggestionView};

#[derive(Parser)]
#[command(
    name = "stephabit",
    version,
    about = "StepHabit schedule engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// IANA time zone that defines days and envelope times (overrides config)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List free windows per day
    Free {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        owner: u64,
        /// Envelope start, HH:MM
        #[arg(long)]
        envelope_start: Option<String>,
        /// Envelope end, HH:MM
        #[arg(long)]
        envelope_end: Option<String>,
    },
    /// List overlapping blocks per day
    Conflicts {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        owner: u64,
        /// Compare every pair of blocks instead of start-order neighbours
        #[arg(long)]
        pairwise: bool,
    },
    /// Suggest activities for free windows
    Suggest {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        owner: u64,
        /// Maximum number of suggestions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Free windows, conflicts and suggestions together
    Plan {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        owner: u64,
    },
    /// Create a block unless it overlaps an existing one
    Add {
        #[arg(short, long)]
        input: Option<String>,
        /// Write the updated snapshot here
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        owner: u64,
        /// Start, RFC 3339 or local YYYY-MM-DDTHH:MM
        #[arg(long)]
        start: String,
        #[arg(long, conflicts_with = "duration")]
        end: Option<String>,
        /// Length in minutes when no end is given
        #[arg(long)]
        duration: Option<i64>,
        /// Link an existing habit
        #[arg(long, conflicts_with = "title")]
        habit: Option<u64>,
        /// Custom event title (find-or-creates a habit)
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum, default_value_t = RepeatArg::Once)]
        repeat: RepeatArg,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a block by id
    Delete {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        id: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Once,
    Daily,
    Weekly,
}

impl From<RepeatArg> for Repeat {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Once => Repeat::Once,
            RepeatArg::Daily => Repeat::Daily,
            RepeatArg::Weekly => Repeat::Weekly,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.timezone.as_deref())?;
    let tz = config.timezone;

    match cli.command {
        Commands::Free {
            input,
            owner,
            envelope_start,
            envelope_end,
        } => {
            // A single flag overrides one side of the configured envelope.
            let envelope = match (envelope_start, envelope_end) {
                (None, None) => None,
                (start, end) => {
                    let start = match start {
                        Some(s) => parse_time_of_day(&s).context("Invalid envelope")?,
                        None => config.envelope.start(),
                    };
                    let end = match end {
                        Some(e) => parse_time_of_day(&e).context("Invalid envelope")?,
                        None => config.envelope.end(),
                    };
                    Some(DayEnvelope::new(start, end).context("Invalid envelope")?)
                }
            };
            let service = open_service(input.as_deref(), config)?;
            let windows = service.compute_free_windows(owner, envelope)?;
            let views: Vec<_> = windows.iter().map(|w| FreeWindowView::new(w, tz)).collect();
            print_json(&views)?;
        }
        Commands::Conflicts {
            input,
            owner,
            pairwise,
        } => {
            let mut config = config;
            if pairwise {
                config.conflict_mode = ConflictMode::Pairwise;
            }
            let service = open_service(input.as_deref(), config)?;
            let conflicts = service.compute_conflicts(owner)?;
            let views: Vec<_> = conflicts.iter().map(|c| ConflictView::new(c, tz)).collect();
            print_json(&views)?;
        }
        Commands::Suggest {
            input,
            owner,
            limit,
        } => {
            let service = open_service(input.as_deref(), config)?;
            let suggestions = service.suggest_blocks(owner, limit)?;
            let views: Vec<_> = suggestions.iter().map(|s| SuggestionView::new(s, tz)).collect();
            print_json(&views)?;
        }
        Commands::Plan { input, owner } => {
            let service = open_service(input.as_deref(), config)?;
            let plan = service.plan(owner)?;
            print_json(&PlanView::new(&plan, tz))?;
        }
        Commands::Add {
            input,
            output,
            owner,
            start,
            end,
            duration,
            habit,
            title,
            repeat,
            notes,
        } => {
            let start = parse_instant(&start, tz).context("Invalid --start")?;
            let end = end
                .map(|e| parse_instant(&e, tz))
                .transpose()
                .context("Invalid --end")?;
            let kind = match habit {
                Some(id) => CandidateKind::Habit(id),
                None => CandidateKind::Custom { title },
            };
            let candidate = NewBlock {
                owner_id: owner,
                start,
                end,
                duration_minutes: duration,
                kind,
                repeat: repeat.into(),
                notes,
            };

            let service = open_service(input.as_deref(), config)?;
            let created = service
                .create_block(candidate)
                .context("Failed to create schedule block")?;
            print_json(&BlockView::new(&created, tz))?;
            save_snapshot(output.as_deref(), service.store())?;
        }
        Commands::Delete { input, output, id } => {
            let service = open_service(input.as_deref(), config)?;
            service
                .delete_block(id)
                .context("Failed to delete schedule block")?;
            print_json(&serde_json::json!({ "deleted": id }))?;
            save_snapshot(output.as_deref(), service.store())?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "stephabit_engine=debug,stephabit_cli=debug"
    } else {
        "stephabit_engine=info,stephabit_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };
    if let Some(name) = timezone {
        config.timezone = EngineConfig::parse_timezone(name)?;
    }
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn open_service(input: Option<&str>, config: EngineConfig) -> Result<ScheduleService<MemoryStore>> {
    let raw = read_input(input)?;
    let snapshot: Snapshot = if raw.trim().is_empty() {
        Snapshot::default()
    } else {
        serde_json::from_str(&raw).context("Failed to parse schedule snapshot")?
    };
    let store = MemoryStore::from_snapshot(snapshot, &config)
        .context("Failed to load schedule snapshot")?;
    Ok(ScheduleService::new(store, config))
}

fn save_snapshot(path: Option<&str>, store: &MemoryStore) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let snapshot = store.to_snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
