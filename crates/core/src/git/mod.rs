//! Read-only git operations for cherryscout.

pub mod changes;
pub mod history;
pub mod remote;
pub mod runner;

#[cfg(test)]
pub(crate) mod fake;

pub use changes::{ChangeSet, ChangeSetInspector};
pub use history::CommitWindowCollector;
pub use remote::RemoteRegistry;
pub use runner::{CommandOutput, CommandRunner, GitCli};
