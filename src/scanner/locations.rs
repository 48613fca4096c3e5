//! Known locations: the fixed set of places the extension leaves residue in.
//!
//! Templates are rooted at the user profile and the editor data directory and
//! turned into [`TargetSpec`]s once per run. Nothing here touches the
//! filesystem, so the removal logic can be exercised against any directory
//! tree by building a [`KnownLocations`] over it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::config::TargetConfig;

/// File inside a workspace `.vscode` directory that lists recommended extensions.
pub const WORKSPACE_RECOMMENDATIONS: &str = "extensions.json";

/// What a target is expected to be once found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Removed as a whole tree.
    Directory,
    /// Removed as a single file.
    File,
    /// Edited in place.
    Config,
}

/// How a target's base path is matched against the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPattern {
    /// The base path itself is the target.
    Exact,
    /// Immediate child directories of the base whose names match the glob.
    Children(String),
    /// Files anywhere below the base whose names match the glob.
    Recursive(String),
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("<exact>"),
            Self::Children(glob) => write!(f, "{glob}"),
            Self::Recursive(glob) => write!(f, "**/{glob}"),
        }
    }
}

/// One thing to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Fixed path, or the directory the pattern is matched within.
    pub base: PathBuf,
    pub pattern: MatchPattern,
    /// Human-readable name used in log lines.
    pub label: String,
    pub kind: TargetKind,
}

impl TargetSpec {
    fn new(base: PathBuf, pattern: MatchPattern, label: &str, kind: TargetKind) -> Self {
        Self {
            base,
            pattern,
            label: label.to_string(),
            kind,
        }
    }
}

/// All targets of a run, grouped by cleanup phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownLocations {
    /// Phase 1: install directories of the extension in each host editor.
    pub extension_dirs: Vec<TargetSpec>,
    /// Phase 2: editor data directories holding extension state.
    pub data_dirs: Vec<TargetSpec>,
    /// Phase 3: editor log directory.
    pub log_dirs: Vec<TargetSpec>,
    /// Phase 4: user configuration files.
    pub config_files: Vec<TargetSpec>,
    /// Phase 5: workspace `.vscode` directory under the working directory.
    pub workspace: TargetSpec,
}

impl KnownLocations {
    /// Interpolate the location templates for one user.
    #[must_use]
    pub fn resolve(
        target: &TargetConfig,
        profile: &Path,
        editor_data: &Path,
        workspace_root: &Path,
    ) -> Self {
        let install_dir = target.install_dir_name();
        let user_dir = editor_data.join("User");

        let extension_dirs = vec![
            TargetSpec::new(
                profile.join(".vscode").join("extensions").join(&install_dir),
                MatchPattern::Exact,
                "VSCode extension",
                TargetKind::Directory,
            ),
            TargetSpec::new(
                profile.join(".trae").join("extensions").join(&install_dir),
                MatchPattern::Exact,
                "Trae extension",
                TargetKind::Directory,
            ),
        ];

        let data_dirs = vec![
            TargetSpec::new(
                user_dir.join("globalStorage"),
                MatchPattern::Children(String::from("augment.*")),
                "VSCode global storage",
                TargetKind::Directory,
            ),
            TargetSpec::new(
                user_dir.join("workspaceStorage"),
                MatchPattern::Children(String::from("*augment*")),
                "VSCode workspace storage",
                TargetKind::Directory,
            ),
            TargetSpec::new(
                editor_data.join("CachedExtensions"),
                MatchPattern::Children(String::from("augment.*")),
                "VSCode cached extensions",
                TargetKind::Directory,
            ),
        ];

        let log_dirs = vec![TargetSpec::new(
            editor_data.join("logs"),
            MatchPattern::Recursive(String::from("*augment*")),
            "VSCode logs",
            TargetKind::File,
        )];

        let config_files = vec![
            TargetSpec::new(
                user_dir.join("settings.json"),
                MatchPattern::Exact,
                "settings",
                TargetKind::Config,
            ),
            TargetSpec::new(
                user_dir.join("keybindings.json"),
                MatchPattern::Exact,
                "keybindings",
                TargetKind::Config,
            ),
        ];

        let workspace = TargetSpec::new(
            workspace_root.to_path_buf(),
            MatchPattern::Children(String::from(".vscode")),
            "extensions",
            TargetKind::Config,
        );

        Self {
            extension_dirs,
            data_dirs,
            log_dirs,
            config_files,
            workspace,
        }
    }
}
