//! Target discovery: where residue may live, and which of it exists.

pub mod locations;
pub mod paths;

pub use locations::{KnownLocations, MatchPattern, TargetKind, TargetSpec};
pub use paths::{Matches, ScanOutcome, Unreadable, scan};
