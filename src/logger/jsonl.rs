//! Append-only JSONL activity log.
//!
//! One JSON object per line: an RFC 3339 `ts` plus the flattened event.

#![allow(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::errors::{CleanError, Result};
use crate::core::stats::CleanupStats;

/// Something worth keeping a durable trace of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent {
    DirectoryRemoved { path: PathBuf, entries: usize },
    DirectorySimulated { path: PathBuf, entries: usize },
    DirectoryDeclined { path: PathBuf },
    FileRemoved { path: PathBuf },
    FileSimulated { path: PathBuf },
    ConfigModified { path: PathBuf, fragments: usize },
    ConfigSimulated { path: PathBuf, fragments: usize },
    BackupWritten { path: PathBuf, backup: PathBuf },
    Failed { path: PathBuf, error: String },
    RunAborted { reason: String },
    RunSummary { simulate: bool, stats: CleanupStats },
}

#[derive(Serialize)]
struct ActivityRecord<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a ActivityEvent,
}

/// Open handle on the activity log file.
#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    file: File,
}

impl ActivityLog {
    /// Open (creating parents and the file as needed) in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CleanError::io(parent, e))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CleanError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and append one event.
    pub fn append(&mut self, event: &ActivityEvent) -> io::Result<()> {
        let record = ActivityRecord {
            ts: chrono::Local::now().to_rfc3339(),
            event,
        };
        let mut line = serde_json::to_string(&record).map_err(io::Error::other)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }
}
