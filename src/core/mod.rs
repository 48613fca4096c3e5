//! Core types shared by every phase: errors, configuration, run options, stats.

pub mod config;
pub mod errors;
pub mod options;
pub mod stats;
