//! Directory and file removal.
//!
//! Directories go through the confirmation gate; single files do not, since
//! they only come from the opt-in log phase. Failures are logged here and
//! returned as `Err` for the caller to tally; they never abort the run.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::cleaner::CleanupContext;
use crate::cleaner::confirm::Decision;
use crate::core::errors::{CleanError, Result};
use crate::logger::ActivityEvent;
use crate::scanner::paths;

/// Why nothing was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Target absent.
    NotFound,
    /// Operator answered no.
    Declined,
}

/// Result of a removal that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Deleted from disk.
    Removed,
    /// Would have been deleted (dry-run).
    Simulated,
    /// Left in place.
    Skipped(SkipReason),
}

impl RemovalOutcome {
    /// Counts toward the `deleted` tally.
    #[must_use]
    pub const fn counts_as_deleted(self) -> bool {
        matches!(self, Self::Removed | Self::Simulated)
    }
}

/// Remove a directory tree after confirmation, clearing read-only bits first.
pub fn remove_directory(
    ctx: &mut CleanupContext,
    path: &Path,
    label: &str,
) -> Result<RemovalOutcome> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        ctx.reporter
            .info(format!("{label} directory does not exist: {}", path.display()));
        return Ok(RemovalOutcome::Skipped(SkipReason::NotFound));
    };

    ctx.reporter.info(format!("found directory: {}", path.display()));
    let entries = if meta.is_dir() {
        paths::count_entries(path)
    } else {
        0
    };
    ctx.reporter.info(format!("directory contains {entries} items"));

    if ctx.options.simulate {
        ctx.reporter
            .warn(format!("[simulate] would delete: {}", path.display()));
        ctx.reporter.record(&ActivityEvent::DirectorySimulated {
            path: path.to_path_buf(),
            entries,
        });
        return Ok(RemovalOutcome::Simulated);
    }

    if !ctx.options.force {
        let description = format!(
            "About to delete {label} directory:\nPath: {}\nItems: {entries}",
            path.display()
        );
        match ctx.confirmer.confirm(&mut ctx.reporter, &description) {
            Ok(Decision::Proceed) => {}
            Ok(Decision::Declined | Decision::Simulated) => {
                ctx.reporter.record(&ActivityEvent::DirectoryDeclined {
                    path: path.to_path_buf(),
                });
                return Ok(RemovalOutcome::Skipped(SkipReason::Declined));
            }
            Err(err) => return Err(fail(ctx, path, &format!("confirming {label}"), err)),
        }
    }

    ctx.reporter.info(format!("deleting directory: {}", path.display()));
    let stuck = clear_readonly_tree(ctx, path);
    if stuck > 0 {
        ctx.reporter.warn(format!(
            "{stuck} entries kept their read-only attribute; attempting deletion anyway"
        ));
    }

    let removal = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(source) = removal {
        let err = CleanError::io(path, source);
        return Err(fail(ctx, path, &format!("deleting {label} directory"), err));
    }

    ctx.reporter.success(format!("deleted {label} directory"));
    ctx.reporter.record(&ActivityEvent::DirectoryRemoved {
        path: path.to_path_buf(),
        entries,
    });
    Ok(RemovalOutcome::Removed)
}

/// Remove a single file. No confirmation.
pub fn remove_file(ctx: &mut CleanupContext, path: &Path, label: &str) -> Result<RemovalOutcome> {
    if !paths::exists(path) {
        ctx.reporter
            .info(format!("{label} does not exist: {}", path.display()));
        return Ok(RemovalOutcome::Skipped(SkipReason::NotFound));
    }

    if ctx.options.simulate {
        ctx.reporter
            .warn(format!("[simulate] would delete {label}: {}", path.display()));
        ctx.reporter.record(&ActivityEvent::FileSimulated {
            path: path.to_path_buf(),
        });
        return Ok(RemovalOutcome::Simulated);
    }

    if let Err(source) = fs::remove_file(path) {
        let err = CleanError::io(path, source);
        return Err(fail(ctx, path, &format!("deleting {label}"), err));
    }

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    ctx.reporter.success(format!("deleted {label}: {name}"));
    ctx.reporter.record(&ActivityEvent::FileRemoved {
        path: path.to_path_buf(),
    });
    Ok(RemovalOutcome::Removed)
}

fn fail(ctx: &mut CleanupContext, path: &Path, action: &str, err: CleanError) -> CleanError {
    ctx.reporter.error(format!("error while {action}: {err}"));
    ctx.reporter.record(&ActivityEvent::Failed {
        path: path.to_path_buf(),
        error: err.to_string(),
    });
    err
}

/// Clears whatever keeps an entry from being unlinked.
pub trait PermissionFixer: std::fmt::Debug {
    /// Make `path` removable by its owner. `meta` is its `symlink_metadata`.
    fn make_writable(&self, path: &Path, meta: &fs::Metadata) -> io::Result<()>;
}

/// Adds owner write permission (and search, for directories).
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerWritable;

impl PermissionFixer for OwnerWritable {
    #[cfg(unix)]
    fn make_writable(&self, path: &Path, meta: &fs::Metadata) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = meta.permissions().mode();
        // Directories also need search permission to be emptied.
        let wanted = if meta.is_dir() { mode | 0o700 } else { mode | 0o200 };
        if wanted == mode {
            return Ok(());
        }
        fs::set_permissions(path, fs::Permissions::from_mode(wanted))
    }

    #[cfg(not(unix))]
    fn make_writable(&self, path: &Path, meta: &fs::Metadata) -> io::Result<()> {
        let mut permissions = meta.permissions();
        if !permissions.readonly() {
            return Ok(());
        }
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)
    }
}

/// Make every entry under `root` writable by its owner so the tree can be
/// unlinked. Symlinks are left alone. A directory that could not be listed
/// is walked again once its own permissions have been changed. Returns how
/// many entries could not be changed; each one is logged as a warning.
fn clear_readonly_tree(ctx: &mut CleanupContext, root: &Path) -> usize {
    let mut stuck = 0;
    let walk = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .contents_first(false);
    for entry in walk {
        match entry {
            Ok(entry) => {
                if entry.path_is_symlink() {
                    continue;
                }
                let Ok(meta) = entry.metadata() else {
                    continue;
                };
                if let Err(err) = ctx.permissions.make_writable(entry.path(), &meta) {
                    stuck += 1;
                    ctx.reporter.warn(format!(
                        "could not clear read-only attribute on {}: {err}",
                        entry.path().display()
                    ));
                }
            }
            // The directory was listed before its mode changed; retry below it.
            Err(err) => match err.path() {
                Some(dir) if dir != root && err.io_error().is_some() => {
                    let dir = dir.to_path_buf();
                    stuck += clear_readonly_tree(ctx, &dir);
                }
                _ => {
                    stuck += 1;
                    ctx.reporter.warn(format!("could not list directory: {err}"));
                }
            },
        }
    }
    stuck
}
