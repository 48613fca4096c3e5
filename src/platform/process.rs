//! Pre-run guard: is the editor still running, and are we privileged?
//!
//! Process enumeration sits behind [`ProcessTable`] so the guard can be tested
//! without real processes. Detection failures never block a cleanup.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::cleaner::Confirmer;
use crate::core::errors::Result;
use crate::logger::Reporter;
use crate::platform::identity;

/// Linux truncates `/proc/<pid>/comm` to this many bytes.
const COMM_MAX: usize = 15;

/// Source of process and privilege facts.
pub trait ProcessTable {
    /// Pids of running processes named `name`.
    fn running(&self, name: &str) -> io::Result<Vec<u32>>;
    /// Whether the current process runs with elevated privileges.
    fn is_elevated(&self) -> bool;
}

/// Reads process names from a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcfsTable {
    root: PathBuf,
}

impl Default for ProcfsTable {
    fn default() -> Self {
        Self::with_root(PathBuf::from("/proc"))
    }
}

impl ProcfsTable {
    /// Reads a procfs-shaped tree rooted at `root`.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ProcessTable for ProcfsTable {
    fn running(&self, name: &str) -> io::Result<Vec<u32>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            // No procfs on this host: nothing can be detected.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut pids = Vec::new();
        for entry in entries.flatten() {
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|raw| raw.parse::<u32>().ok())
            else {
                continue;
            };
            // Processes can exit between listing and reading.
            let Ok(comm) = fs::read_to_string(entry.path().join("comm")) else {
                continue;
            };
            if comm_matches(comm.trim_end(), name) {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    fn is_elevated(&self) -> bool {
        identity::is_elevated()
    }
}

fn comm_matches(comm: &str, name: &str) -> bool {
    if comm == name {
        return true;
    }
    name.len() > COMM_MAX && comm.len() == COMM_MAX && name.starts_with(comm)
}

/// Checks run once before any phase.
pub struct ProcessGuard {
    table: Box<dyn ProcessTable>,
    process_name: String,
}

impl std::fmt::Debug for ProcessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGuard")
            .field("process_name", &self.process_name)
            .finish_non_exhaustive()
    }
}

impl ProcessGuard {
    #[must_use]
    pub fn new(table: Box<dyn ProcessTable>, process_name: impl Into<String>) -> Self {
        Self {
            table,
            process_name: process_name.into(),
        }
    }

    /// Guard backed by the host's `/proc`.
    #[must_use]
    pub fn procfs(process_name: impl Into<String>) -> Self {
        Self::new(Box::<ProcfsTable>::default(), process_name)
    }

    /// Whether the run may go ahead with respect to a running editor.
    ///
    /// A running editor is reported; unless forced the operator is asked to
    /// continue, and anything but yes returns `false` (abort the run). The
    /// question is asked even under simulate. Enumeration failures are
    /// warned about and treated as "not running".
    pub fn editor_check(&self, reporter: &mut Reporter, confirmer: &mut Confirmer) -> Result<bool> {
        let pids = match self.table.running(&self.process_name) {
            Ok(pids) => pids,
            Err(err) => {
                reporter.warn(format!(
                    "could not check for running {} processes: {err}",
                    self.process_name
                ));
                return Ok(true);
            }
        };
        if pids.is_empty() {
            return Ok(true);
        }

        let listed: Vec<String> = pids.iter().map(u32::to_string).collect();
        reporter.warn(format!(
            "{} is running (pid {}); close the editor before cleaning up",
            self.process_name,
            listed.join(", ")
        ));
        if confirmer.is_forced() {
            return Ok(true);
        }
        if confirmer.ask_yes_no(reporter, "Continue cleanup anyway? (y/N): ")? {
            Ok(true)
        } else {
            reporter.warn("cleanup aborted by user");
            Ok(false)
        }
    }

    /// Best-effort privilege check; `false` when it cannot be determined.
    #[must_use]
    pub fn has_elevated_privileges(&self) -> bool {
        self.table.is_elevated()
    }
}
