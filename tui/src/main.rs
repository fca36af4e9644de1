mod app;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use engine::content::builtin_encounters;
use engine::transfer::{default_export_filename, parse_import};
use engine::{
    Backend, ImportMode, LocalStore, NullNotifier, Persistence, RoomStore, Tracker,
};

use crate::app::{App, ToastNotifier};

#[derive(Parser)]
#[command(name = "sr-tracker", about = "Enemy roster tracker", version)]
struct Cli {
    /// Directory for the standalone roster file and the session log.
    #[arg(long, default_value = ".sr-tracker")]
    data_dir: PathBuf,

    /// Shared room directory; when set, the tracker probes it at startup and
    /// syncs the roster there while it stays reachable.
    #[arg(long)]
    room: Option<PathBuf>,

    /// How long to wait for the room before falling back to standalone mode.
    #[arg(long, default_value_t = 3)]
    probe_secs: u64,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the tracked roster.
    List,
    /// Write the roster to a dated document.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge a roster document into the tracker.
    Import {
        /// Path to an exported document or a bare record list.
        file: Option<PathBuf>,
        /// Load a bundled encounter instead of a file.
        #[arg(long, conflicts_with = "file")]
        builtin: Option<String>,
        #[arg(long, value_enum, default_value_t = MergeMode::Append)]
        mode: MergeMode,
    },
    /// Delete every tracked enemy.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MergeMode {
    Replace,
    Append,
}

impl From<MergeMode> for ImportMode {
    fn from(mode: MergeMode) -> Self {
        match mode {
            MergeMode::Replace => ImportMode::Replace,
            MergeMode::Append => ImportMode::Append,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let room = cli.room.as_ref().map(RoomStore::new);
    let host = room
        .clone()
        .map(|store| Box::new(store) as Box<dyn Backend>);
    let persistence = Persistence::with_probe_window(
        host,
        LocalStore::new(&cli.data_dir),
        Duration::from_secs(cli.probe_secs),
    );

    match cli.command {
        Some(command) => run_headless(command, persistence),
        None => run_tui(&cli.data_dir, room, persistence),
    }
}

fn run_headless(command: Cmd, persistence: Persistence) -> Result<()> {
    let mut tracker = Tracker::new(persistence, NullNotifier);
    tracker.resolve_now();

    match command {
        Cmd::List => {
            for enemy in tracker.roster().iter() {
                println!(
                    "{:<24} {:<12} {:>4}/{:<4}",
                    enemy.name, enemy.kind, enemy.current_hp, enemy.max_hp
                );
            }
            println!("{} enemies tracked", tracker.roster().len());
        }
        Cmd::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(default_export_filename()));
            tracker
                .export_to(&path)
                .with_context(|| format!("failed to export to {}", path.display()))?;
            println!("exported {} enemies to {}", tracker.roster().len(), path.display());
        }
        Cmd::Import {
            file,
            builtin,
            mode,
        } => {
            let count = match (file, builtin) {
                (Some(path), None) => tracker
                    .import(&path, mode.into())
                    .context("Failed to import")?,
                (None, Some(name)) => {
                    let text = builtin_encounters()
                        .get(name.as_str())
                        .copied()
                        .with_context(|| format!("no bundled encounter named {name:?}"))?;
                    let records = parse_import(text).context("Failed to import")?;
                    tracker.import_records(records, mode.into())
                }
                _ => bail!("pass a file path or --builtin NAME"),
            };
            println!("imported {} enemies", count);
        }
        Cmd::Clear { yes } => {
            if !yes {
                bail!("refusing to clear without --yes");
            }
            let count = tracker.clear_all();
            println!("cleared {} enemies", count);
        }
    }
    Ok(())
}

fn run_tui(data_dir: &Path, room: Option<RoomStore>, persistence: Persistence) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(data_dir, "sr-tracker.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let tracker = Tracker::new(persistence, ToastNotifier::new(room));
    let app = App::new(tracker);

    enable_raw_mode().context("failed to enter raw mode")?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = app.run(&mut terminal);

    disable_raw_mode().ok();
    io::stdout().execute(LeaveAlternateScreen).ok();
    result
}
