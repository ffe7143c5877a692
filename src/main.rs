// SPDX-License-Identifier: MIT
//
// kilo — a minimal full-screen terminal text editor.
//
// This is the main binary that wires the two crates together:
//
//   kilo-term   → raw mode, window size, key decoding, VT100 output
//   kilo-editor → rows, cursor, viewport, frame rendering
//
// The loop is single-threaded and strictly alternating:
//
//   refresh → one write() of the whole frame → block for one key → dispatch
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status bar (reverse video)   │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘
//
// Any error inside the loop is fatal: the raw-mode guard drops (restoring
// the terminal), the screen is cleared, the error goes to stderr and the
// process exits with status 1.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use kilo_editor::config::{Config, DEFAULT_TAB_STOP};
use kilo_editor::editor::{Action, Editor};
use kilo_editor::error::Result;
use kilo_term::ansi;
use kilo_term::input::KeyReader;
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::{self, FdWriter, RawMode};

/// Env var holding the log filter (`EnvFilter` syntax).
const LOG_FILTER_ENV: &str = "KILO_LOG";

/// Log filter when `KILO_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal full-screen terminal text editor.
#[derive(Debug, Parser)]
#[command(name = "kilo", version, about)]
struct Cli {
    /// File to open.
    file: Option<PathBuf>,

    /// Columns between tab stops.
    #[arg(long, env = "KILO_TAB_STOP", default_value_t = DEFAULT_TAB_STOP, value_parser = parse_tab_stop)]
    tab_stop: usize,

    /// Write logs to this file. Nothing is logged without it.
    #[arg(long, env = "KILO_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn parse_tab_stop(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("tab stop must be at least 1".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file-only subscriber. Stdout is the screen, so nothing is
/// ever logged there. The returned guard flushes the writer on drop.
fn init_logging(path: &Path) -> Option<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name()?.to_string_lossy().into_owned();

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("kilo: log file {}: {e}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}

// ─── Main loop ──────────────────────────────────────────────────────────────

fn run(file: Option<&Path>, config: Config) -> Result<()> {
    let raw = RawMode::enable()?;

    let mut stdin = io::stdin();
    let size = terminal::window_size(&mut io::stdout(), &mut stdin)?;
    tracing::info!(cols = size.cols, rows = size.rows, "terminal size");

    let help = config.help_message.clone();
    let mut editor = Editor::new(size, config);
    if let Some(path) = file {
        editor.open(path)?;
    }
    editor.set_status_message(help);

    let mut keys = KeyReader::new(stdin);
    let mut screen = FdWriter::stdout();
    let mut out = OutputBuffer::new();
    loop {
        editor.refresh_screen(&mut out);
        out.write_once(&mut screen)?;

        let key = keys.read_key()?;
        if editor.process_key(key) == Action::Quit {
            break;
        }
    }

    raw.disable()?;
    Ok(())
}

/// Leave a blank screen with the cursor home, whatever state the last
/// frame left behind.
fn clear_screen() {
    let mut stdout = io::stdout().lock();
    ansi::clear_screen(&mut stdout).ok();
    ansi::cursor_home(&mut stdout).ok();
    stdout.flush().ok();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let log_guard = cli.log_file.as_deref().and_then(init_logging);
    let config = Config::default().with_tab_stop(cli.tab_stop);

    let code = match run(cli.file.as_deref(), config) {
        Ok(()) => {
            clear_screen();
            tracing::info!("quit");
            0
        }
        Err(e) => {
            clear_screen();
            tracing::error!(error = %e, "fatal");
            eprintln!("kilo: {e}");
            1
        }
    };

    // process::exit skips destructors; flush the log writer first.
    drop(log_guard);
    process::exit(code);
}

// ─── Tests ──────────────────────────────────────────────────────────────────
