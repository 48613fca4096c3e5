//! Top-level CLI definition and startup wiring.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use colored::Color;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use crate::cleaner::{Cleaner, CleanupContext, RunReport, StdinPrompter};
use crate::core::config::Config;
use crate::core::errors::{CleanError, Result};
use crate::core::options::RunOptions;
use crate::logger::{ActivityLog, Reporter};
use crate::platform::{ProcessGuard, identity};
use crate::scanner::KnownLocations;

/// Status returned when startup or the run fails.
pub const EXIT_FAILURE: u8 = 1;

/// Remove files, directories, and config entries left behind by the Augment
/// editor extension in VSCode and Trae.
#[derive(Debug, Parser)]
#[command(name = "augment-cleaner", version, about)]
pub struct Cli {
    /// Delete without asking for confirmation.
    #[arg(short, long)]
    pub force: bool,
    /// Only show what would be removed; change nothing.
    #[arg(short = 'w', long = "whatif")]
    pub whatif: bool,
    /// Do not back up config files before editing them.
    #[arg(short, long)]
    pub skip_backup: bool,
    /// Also remove extension log files (skipped by default).
    #[arg(short = 'l', long)]
    pub clean_logs: bool,
    /// Configuration file (default: $AUGMENT_CLEANER_CONFIG, then
    /// $XDG_CONFIG_HOME/augment-cleaner/config.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
    /// Print the summary as JSON on stdout; progress goes to stderr.
    #[arg(long)]
    pub json: bool,
    /// Exit without waiting for a keypress.
    #[arg(long)]
    pub no_pause: bool,
}

impl Cli {
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            force: self.force,
            simulate: self.whatif,
            skip_backup: self.skip_backup,
            include_logs: self.clean_logs,
        }
    }
}

/// Load configuration, wire up the cleaner, and run it.
///
/// # Errors
/// Configuration failures and a failed guard prompt. Per-item failures are
/// counted in the report instead.
pub fn run(cli: &Cli) -> Result<RunReport> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    let mut reporter = console_reporter(cli);
    if let Some(path) = &config.logging.jsonl_path {
        match ActivityLog::open(path) {
            Ok(log) => reporter.attach_activity_log(log),
            Err(err) => reporter.warn(format!("activity log disabled: {err}")),
        }
    }

    let profile = config.profile_dir();
    let editor_data = config.editor_data_dir(&profile);
    let cwd = std::env::current_dir().map_err(|e| CleanError::io(".", e))?;
    let locations = KnownLocations::resolve(&config.target, &profile, &editor_data, &cwd);

    let ctx = CleanupContext::new(cli.run_options(), reporter, Box::new(StdinPrompter));
    let guard = ProcessGuard::procfs(config.target.process_name.clone());
    let mut cleaner = Cleaner::new(
        ctx,
        guard,
        locations,
        config.target,
        identity::current_username(),
    );
    if cli.json {
        cleaner = cleaner.without_summary_block();
    }

    let report = cleaner.run()?;
    if cli.json {
        let line = serde_json::to_string(&report).map_err(|e| CleanError::Runtime {
            details: format!("failed to serialize summary: {e}"),
        })?;
        println!("{line}");
    }
    Ok(report)
}

/// Log an error that ended the process. Under `--json` it goes to stderr so
/// stdout never carries anything but the summary object.
pub fn report_fatal(cli: &Cli, err: &CleanError) {
    let stage = if err.is_startup_fatal() {
        "startup"
    } else {
        "cleanup"
    };
    console_reporter(cli).error(format!("{stage} failed [{}]: {err}", err.code()));
}

/// Progress and errors share stdout, except under `--json` where stdout is
/// reserved for the summary.
fn console_reporter(cli: &Cli) -> Reporter {
    if cli.json {
        Reporter::with_sink(Box::new(io::stderr()))
    } else {
        Reporter::stdout()
    }
}

/// Hold the window open until a key is pressed. Only when both ends are an
/// interactive terminal.
pub fn wait_for_keypress(cli: &Cli) -> io::Result<()> {
    if cli.no_pause || cli.json || !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Ok(());
    }
    let mut reporter = Reporter::stdout();
    reporter.blank();
    reporter.colored_line("Press any key to exit...", Color::BrightBlack);

    let _raw = RawMode::enable()?;
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

/// Raw mode for the lifetime of the value.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
