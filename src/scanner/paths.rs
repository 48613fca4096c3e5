//! Path scanning: resolve a [`TargetSpec`] to the entries that exist on disk.
//!
//! Symlinks are never followed: a symlinked directory is neither matched as a
//! data directory nor descended into while looking for log files. A nested
//! directory that cannot be read is reported back and skipped; the rest of
//! the tree is still searched.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::core::errors::{CleanError, Result};
use crate::scanner::locations::{MatchPattern, TargetSpec};

/// Case sensitivity follows the host filesystem convention.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(any(windows, target_os = "macos")),
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A directory the scan could not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unreadable {
    /// The directory that was skipped.
    pub path: PathBuf,
    /// The I/O error, as text.
    pub reason: String,
}

/// Entries found for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Existing entries matching the target, sorted by path.
    pub paths: Vec<PathBuf>,
    /// Directories skipped because they could not be listed.
    pub unreadable: Vec<Unreadable>,
}

impl From<Vec<PathBuf>> for Matches {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            unreadable: Vec::new(),
        }
    }
}

/// Result of scanning one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The base path does not exist; informational, not an error.
    BaseMissing,
    /// The base exists; what was found below it.
    Found(Matches),
}

impl ScanOutcome {
    /// Matched paths (empty when the base is missing).
    #[must_use]
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Self::BaseMissing => Vec::new(),
            Self::Found(matches) => matches.paths,
        }
    }
}

/// Resolve a target against the filesystem.
pub fn scan(target: &TargetSpec) -> Result<ScanOutcome> {
    if !exists(&target.base) {
        return Ok(ScanOutcome::BaseMissing);
    }
    let found = match &target.pattern {
        MatchPattern::Exact => Matches::from(vec![target.base.clone()]),
        MatchPattern::Children(glob) => Matches::from(matching_child_dirs(&target.base, glob)?),
        MatchPattern::Recursive(glob) => matching_files_recursive(&target.base, glob)?,
    };
    Ok(ScanOutcome::Found(found))
}

/// Whether anything (including a dangling symlink) exists at `path`.
#[must_use]
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Immediate child directories of `base` whose names match `glob`.
pub fn matching_child_dirs(base: &Path, glob: &str) -> Result<Vec<PathBuf>> {
    let pattern = compile(glob)?;
    let mut found = Vec::new();
    for entry in fs::read_dir(base).map_err(|e| CleanError::io(base, e))? {
        let entry = entry.map_err(|e| CleanError::io(base, e))?;
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() && name_matches(&pattern, &entry.path()) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// One step of a recursive walk.
#[derive(Debug)]
enum Visit {
    File(PathBuf),
    Other,
    Unreadable(Unreadable),
}

impl Visit {
    fn from_walk(base: &Path, entry: walkdir::Result<walkdir::DirEntry>) -> Self {
        match entry {
            Ok(entry) if entry.file_type().is_file() => Self::File(entry.into_path()),
            Ok(_) => Self::Other,
            Err(err) => Self::Unreadable(Unreadable {
                path: err.path().unwrap_or(base).to_path_buf(),
                reason: err
                    .io_error()
                    .map_or_else(|| err.to_string(), ToString::to_string),
            }),
        }
    }
}

/// Regular files anywhere below `base` whose names match `glob`.
///
/// Subdirectories that cannot be listed end up in [`Matches::unreadable`].
pub fn matching_files_recursive(base: &Path, glob: &str) -> Result<Matches> {
    let pattern = compile(glob)?;
    let visits = WalkDir::new(base)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| Visit::from_walk(base, entry));
    Ok(collect_files(&pattern, visits))
}

fn collect_files(pattern: &Pattern, visits: impl IntoIterator<Item = Visit>) -> Matches {
    let mut matches = Matches::default();
    for visit in visits {
        match visit {
            Visit::File(path) if name_matches(pattern, &path) => matches.paths.push(path),
            Visit::File(_) | Visit::Other => {}
            Visit::Unreadable(skipped) => matches.unreadable.push(skipped),
        }
    }
    matches.paths.sort();
    matches
}

/// Number of filesystem entries below `path` (not counting `path` itself).
/// Unreadable subtrees contribute what could be read.
#[must_use]
pub fn count_entries(path: &Path) -> usize {
    WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .count()
}

fn compile(glob: &str) -> Result<Pattern> {
    Pattern::new(glob).map_err(|e| CleanError::Pattern {
        pattern: glob.to_string(),
        details: e.to_string(),
    })
}

fn name_matches(pattern: &Pattern, path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS))
}
