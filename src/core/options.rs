//! Per-run switches supplied once at startup.

use serde::Serialize;

/// Four independent flags that shape a cleanup run. Immutable for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    /// Skip every confirmation prompt.
    pub force: bool,
    /// Dry-run: report intended actions, mutate nothing.
    pub simulate: bool,
    /// Do not write `.backup_<timestamp>` copies before editing config files.
    pub skip_backup: bool,
    /// Enable the optional log-file phase.
    pub include_logs: bool,
}

impl RunOptions {
    /// Whether a config edit in this run writes a backup first.
    #[must_use]
    pub const fn writes_backups(&self) -> bool {
        !self.skip_backup && !self.simulate
    }
}
