//! Cleanup actions and the phase pipeline that drives them.

pub mod config_edit;
pub mod confirm;
pub mod orchestrator;
pub mod remover;

pub use config_edit::{ConfigPatch, EditOutcome};
pub use confirm::{Confirmer, Decision, Prompter, ScriptedPrompter, StdinPrompter};
pub use orchestrator::{Cleaner, RunReport};
pub use remover::{OwnerWritable, PermissionFixer, RemovalOutcome, SkipReason};

use crate::core::options::RunOptions;
use crate::logger::Reporter;

/// Everything a single cleanup action needs: the run flags, somewhere to
/// report, the confirmation gate, and how read-only entries are unlocked.
#[derive(Debug)]
pub struct CleanupContext {
    pub options: RunOptions,
    pub reporter: Reporter,
    pub confirmer: Confirmer,
    pub permissions: Box<dyn PermissionFixer>,
}

impl CleanupContext {
    #[must_use]
    pub fn new(options: RunOptions, reporter: Reporter, prompter: Box<dyn Prompter>) -> Self {
        let confirmer = Confirmer::new(&options, prompter);
        Self {
            options,
            reporter,
            confirmer,
            permissions: Box::new(OwnerWritable),
        }
    }

    /// Replace how read-only entries are made removable.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Box<dyn PermissionFixer>) -> Self {
        self.permissions = permissions;
        self
    }
}
