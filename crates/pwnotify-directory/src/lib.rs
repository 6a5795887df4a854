//! Directory snapshot backend for `pwnotify`.
//!
//! Reads group membership and the domain password policy from a JSON export
//! of the directory, re-reading the file on every query.

mod directory;
mod snapshot;

pub mod error;

pub use directory::SnapshotDirectory;
pub use error::{Error, Result};
pub use snapshot::{GroupEntry, MemberEntry, Snapshot, max_age_from_interval};
