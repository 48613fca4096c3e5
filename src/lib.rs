//! Augment Cleaner: removes the directories, log files, and configuration
//! entries the Augment editor extension leaves behind in VSCode and Trae.
//!
//! A run walks a fixed list of known locations in five phases, asking before
//! every directory removal unless forced, and never touching the disk in
//! simulate mode. Config files are edited textually and backed up first.

pub mod cleaner;
#[cfg(feature = "cli")]
pub mod cli_app;
pub mod core;
pub mod logger;
pub mod platform;
pub mod scanner;
