//! The cleanup pipeline.
//!
//! One run is: guard check, then five phases in fixed order (extension
//! directories, editor data, logs when enabled, user config files, workspace
//! recommendations), then the summary. A failing item is tallied and the phase
//! moves on; only a failure of the pre-run guard ends a run early.

use std::path::Path;

use colored::Color;
use serde::Serialize;

use crate::cleaner::config_edit::{self, EditOutcome};
use crate::cleaner::remover::{self, RemovalOutcome, SkipReason};
use crate::cleaner::CleanupContext;
use crate::core::config::TargetConfig;
use crate::core::errors::Result;
use crate::core::stats::CleanupStats;
use crate::logger::ActivityEvent;
use crate::platform::ProcessGuard;
use crate::scanner::locations::{KnownLocations, TargetSpec, WORKSPACE_RECOMMENDATIONS};
use crate::scanner::paths::{self, ScanOutcome};

/// Outcome of a whole run, as printed by `--json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub simulate: bool,
    /// The operator stopped the run at the guard; no phase ran.
    pub aborted: bool,
    pub stats: CleanupStats,
}

/// Drives one cleanup run.
#[derive(Debug)]
pub struct Cleaner {
    ctx: CleanupContext,
    guard: ProcessGuard,
    locations: KnownLocations,
    target: TargetConfig,
    username: String,
    summary_block: bool,
}

impl Cleaner {
    #[must_use]
    pub fn new(
        ctx: CleanupContext,
        guard: ProcessGuard,
        locations: KnownLocations,
        target: TargetConfig,
        username: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            guard,
            locations,
            target,
            username: username.into(),
            summary_block: true,
        }
    }

    /// Leave the human summary block out (the caller reports the stats itself).
    #[must_use]
    pub fn without_summary_block(mut self) -> Self {
        self.summary_block = false;
        self
    }

    /// Run every phase and return the tallies.
    ///
    /// Item failures are counted, not returned. `Err` only comes from the
    /// guard prompt failing to read an answer.
    pub fn run(&mut self) -> Result<RunReport> {
        let simulate = self.ctx.options.simulate;
        let mut report = RunReport {
            simulate,
            ..RunReport::default()
        };

        self.ctx.reporter.separator(Some(&format!(
            "Augment extension residue cleaner v{}",
            env!("CARGO_PKG_VERSION")
        )));
        self.ctx.reporter.blank();

        if !self
            .guard
            .editor_check(&mut self.ctx.reporter, &mut self.ctx.confirmer)?
        {
            report.aborted = true;
            self.ctx.reporter.record(&ActivityEvent::RunAborted {
                reason: format!("{} is running", self.target.process_name),
            });
            return Ok(report);
        }

        if !self.guard.has_elevated_privileges() {
            self.ctx.reporter.warn(
                "not running with elevated privileges; some entries may not be removable",
            );
        }
        self.ctx
            .reporter
            .info(format!("current user: {}", self.username));
        self.ctx.reporter.info(format!(
            "extension: {} {}",
            self.target.extension_id, self.target.version
        ));
        if simulate {
            self.ctx.reporter.blank();
            self.ctx.reporter.colored_line(
                "=== SIMULATE MODE: showing what would be removed ===",
                Color::Yellow,
            );
        }

        let stats = &mut report.stats;
        self.clean_extension_dirs(stats);
        self.clean_data_dirs(stats);
        if self.ctx.options.include_logs {
            self.clean_logs(stats);
        } else {
            self.ctx
                .reporter
                .phase_header("Skipping log file cleanup", Color::Yellow);
            self.ctx
                .reporter
                .info("pass --clean-logs to remove log files as well");
        }
        self.clean_config_files(stats);
        self.clean_workspace(stats);

        if self.summary_block {
            self.print_summary(&report.stats);
        }
        self.ctx.reporter.record(&ActivityEvent::RunSummary {
            simulate,
            stats: report.stats,
        });
        Ok(report)
    }

    fn clean_extension_dirs(&mut self, stats: &mut CleanupStats) {
        self.ctx
            .reporter
            .phase_header("Phase 1: extension directories", Color::Cyan);

        for target in &self.locations.extension_dirs {
            self.ctx.reporter.blank();
            self.ctx.reporter.colored_line(
                &format!("checking {} directory...", target.label),
                Color::White,
            );
            if paths::exists(&target.base) {
                stats.record_found();
                let result = remover::remove_directory(&mut self.ctx, &target.base, &target.label);
                tally_removal(stats, &result);
            } else {
                self.ctx.reporter.info(format!(
                    "{} directory does not exist, nothing to clean",
                    target.label
                ));
            }
        }
    }

    fn clean_data_dirs(&mut self, stats: &mut CleanupStats) {
        self.ctx
            .reporter
            .phase_header("Phase 2: editor data directories", Color::Cyan);

        for target in &self.locations.data_dirs {
            self.ctx.reporter.blank();
            self.ctx
                .reporter
                .colored_line(&format!("checking {}...", target.label), Color::White);
            let Some(items) = scan_or_report(&mut self.ctx, stats, target) else {
                continue;
            };
            if items.is_empty() {
                self.ctx
                    .reporter
                    .info(format!("no Augment entries in {}", target.label));
            }
            for item in items {
                stats.record_found();
                let label = format!("{} - {}", target.label, file_name(&item));
                let result = remover::remove_directory(&mut self.ctx, &item, &label);
                tally_removal(stats, &result);
            }
        }
    }

    fn clean_logs(&mut self, stats: &mut CleanupStats) {
        self.ctx
            .reporter
            .phase_header("Phase 3: log files", Color::Cyan);

        for target in &self.locations.log_dirs {
            self.ctx.reporter.blank();
            self.ctx
                .reporter
                .colored_line(&format!("checking {}...", target.label), Color::White);
            let Some(files) = scan_or_report(&mut self.ctx, stats, target) else {
                continue;
            };
            if files.is_empty() {
                self.ctx
                    .reporter
                    .info(format!("no Augment entries in {}", target.label));
            }
            for file in files {
                stats.record_found();
                let result = remover::remove_file(&mut self.ctx, &file, "log file");
                tally_removal(stats, &result);
            }
        }
    }

    fn clean_config_files(&mut self, stats: &mut CleanupStats) {
        self.ctx
            .reporter
            .phase_header("Phase 4: configuration files", Color::Cyan);

        for target in &self.locations.config_files {
            self.ctx.reporter.blank();
            self.ctx.reporter.colored_line(
                &format!("checking {} config file...", target.label),
                Color::White,
            );
            let result = config_edit::clean_config(&mut self.ctx, &target.base, &target.label);
            tally_edit(stats, &result);
        }
    }

    fn clean_workspace(&mut self, stats: &mut CleanupStats) {
        self.ctx
            .reporter
            .phase_header("Phase 5: workspace extension recommendations", Color::Cyan);

        let target = &self.locations.workspace;
        let Some(folders) = scan_or_report(&mut self.ctx, stats, target) else {
            return;
        };
        let mut checked = 0;
        for folder in folders {
            let file = folder.join(WORKSPACE_RECOMMENDATIONS);
            if !paths::exists(&file) {
                continue;
            }
            checked += 1;
            self.ctx.reporter.colored_line(
                &format!("checking workspace recommendations: {}", file.display()),
                Color::White,
            );
            let result = config_edit::clean_config(&mut self.ctx, &file, &target.label);
            tally_edit(stats, &result);
        }
        if checked == 0 {
            self.ctx.reporter.info(format!(
                "no workspace recommendations under {}",
                target.base.display()
            ));
        }
    }

    fn print_summary(&mut self, stats: &CleanupStats) {
        let options = self.ctx.options;
        let reporter = &mut self.ctx.reporter;

        reporter.blank();
        reporter.separator(Some("Cleanup summary"));
        reporter.info(format!("items found: {}", stats.found));
        reporter.info(format!("config files modified: {}", stats.config_modified));
        if options.simulate {
            reporter.warn(format!("items that would be deleted: {}", stats.deleted));
        } else {
            reporter.success(format!("items deleted: {}", stats.deleted));
        }
        if stats.skipped > 0 {
            reporter.warn(format!("items skipped: {}", stats.skipped));
        }
        if stats.errors > 0 {
            reporter.error(format!("items failed: {}", stats.errors));
        }

        reporter.blank();
        if options.simulate {
            reporter.colored_line("Simulation complete.", Color::Yellow);
            reporter.colored_line("Run again with these flags to clean up for real:", Color::Yellow);
            for hint in [
                "  --force          : skip confirmation prompts",
                "  --clean-logs     : remove log files as well",
                "  --skip-backup    : do not back up config files",
            ] {
                reporter.colored_line(hint, Color::BrightBlack);
            }
        } else if stats.changed_anything() {
            reporter.colored_line(
                "Cleanup complete. Augment extension residue has been removed.",
                Color::Green,
            );
            if stats.config_modified > 0 && options.writes_backups() {
                reporter.colored_line(
                    "Config files were backed up; restore from the .backup_* files if needed.",
                    Color::Green,
                );
            }
        } else {
            reporter.colored_line("No Augment extension residue found.", Color::Green);
        }
    }
}

/// Scan a target, logging a missing base or a scan failure. `None` means
/// there is nothing to process.
fn scan_or_report(
    ctx: &mut CleanupContext,
    stats: &mut CleanupStats,
    target: &TargetSpec,
) -> Option<Vec<std::path::PathBuf>> {
    match paths::scan(target) {
        Ok(ScanOutcome::Found(matches)) => {
            for skipped in &matches.unreadable {
                ctx.reporter.warn(format!(
                    "could not read {}, skipping it: {}",
                    skipped.path.display(),
                    skipped.reason
                ));
            }
            Some(matches.paths)
        }
        Ok(ScanOutcome::BaseMissing) => {
            ctx.reporter.info(format!(
                "{} path does not exist: {}",
                target.label,
                target.base.display()
            ));
            None
        }
        Err(err) => {
            ctx.reporter
                .error(format!("could not scan {}: {err}", target.label));
            stats.record_error();
            None
        }
    }
}

fn tally_removal(stats: &mut CleanupStats, result: &Result<RemovalOutcome>) {
    match result {
        Ok(outcome) if outcome.counts_as_deleted() => stats.record_deleted(),
        Ok(RemovalOutcome::Skipped(SkipReason::Declined)) => stats.record_skipped(),
        Ok(_) => {}
        Err(_) => stats.record_error(),
    }
}

fn tally_edit(stats: &mut CleanupStats, result: &Result<EditOutcome>) {
    match result {
        Ok(outcome) if outcome.counts_as_modified() => stats.record_config_modified(),
        Ok(_) => {}
        Err(_) => stats.record_error(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
