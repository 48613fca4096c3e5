//! Host facts: who is running the tool and what else is running.

pub mod identity;
pub mod process;

pub use process::{ProcessGuard, ProcessTable, ProcfsTable};
