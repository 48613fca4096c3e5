//! ACL-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Top-level error type for the Augment cleaner.
///
/// A missing target or a declined confirmation is not an error; those travel
/// as [`crate::cleaner::RemovalOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("[ACL-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[ACL-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[ACL-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[ACL-2001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[ACL-2002] {path} is not valid UTF-8 text")]
    Encoding { path: PathBuf },

    #[error("[ACL-2003] invalid pattern {pattern:?}: {details}")]
    Pattern { pattern: String, details: String },

    #[error("[ACL-3001] failed to read confirmation input: {source}")]
    Prompt {
        #[source]
        source: std::io::Error,
    },

    #[error("[ACL-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl CleanError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "ACL-1001",
            Self::MissingConfig { .. } => "ACL-1002",
            Self::ConfigParse { .. } => "ACL-1003",
            Self::Io { .. } => "ACL-2001",
            Self::Encoding { .. } => "ACL-2002",
            Self::Pattern { .. } => "ACL-2003",
            Self::Prompt { .. } => "ACL-3001",
            Self::Runtime { .. } => "ACL-3900",
        }
    }

    /// Whether the failure prevents the run from starting at all.
    #[must_use]
    pub const fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for CleanError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
