//! cherryscout core library.
//!
//! This crate finds the commits one ublue-os image tree (Aurora or Bluefin)
//! made recently that the other may want to cherry-pick, and predicts
//! whether each would apply cleanly: remote tracking, windowed history,
//! automation filtering, change classification, PR link resolution,
//! in-memory merge simulation, and the advisory loop tying them together.

pub mod advisor;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod filter;
pub mod git;
pub mod models;
pub mod pr;
pub mod report;
pub mod signals;

// Re-exports for convenience.
pub use advisor::{Advisor, AdvisorOptions};
pub use config::AdvisorConfig;
pub use errors::AdvisorError;
pub use filter::AuthorFilter;
pub use git::GitCli;
pub use report::ReportSink;
