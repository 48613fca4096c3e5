//! Run-scoped counters, threaded through every phase by `&mut`.

use serde::Serialize;

/// Counters accumulated over one cleanup run. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupStats {
    /// Directories and files that matched a target.
    pub found: usize,
    /// Items deleted, or that would be deleted under simulate.
    pub deleted: usize,
    /// Items left in place because the operator declined.
    pub skipped: usize,
    /// Config files edited, or that would be edited under simulate.
    pub config_modified: usize,
    /// Failed removals and failed config edits.
    pub errors: usize,
}

impl CleanupStats {
    pub(crate) fn record_found(&mut self) {
        self.found += 1;
    }

    pub(crate) fn record_deleted(&mut self) {
        self.deleted += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn record_config_modified(&mut self) {
        self.config_modified += 1;
    }

    pub(crate) fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Whether the run changed (or would change) anything on disk.
    #[must_use]
    pub const fn changed_anything(&self) -> bool {
        self.deleted > 0 || self.config_modified > 0
    }
}
