//! Cherry-pick conflict prediction.
//!
//! The conflict subsystem is responsible for:
//! 1. **Simulation** -- running an in-memory three-way tree merge.
//! 2. **Scanning** -- turning the merge transcript into conflicting paths.
//! 3. **Verdicts** -- folding both into a conservative compatibility verdict.

pub mod oracle;
pub mod scanner;

pub use oracle::CompatibilityOracle;
pub use scanner::{ConflictScanner, MarkerScanner, MergeStrategy, WriteTreeScanner};
