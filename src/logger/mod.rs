//! Console reporting plus an optional JSONL activity trail.

pub mod console;
pub mod jsonl;

pub use console::{CaptureSink, LogLevel, Reporter};
pub use jsonl::{ActivityEvent, ActivityLog};
