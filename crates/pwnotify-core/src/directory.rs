//! The `Directory` trait: where group members and the domain password policy
//! come from.
//!
//! Implemented by directory backends (e.g. `pwnotify-directory`). The run
//! coordinator depends on this abstraction only.

use chrono::TimeDelta;

use crate::model::UserRecord;

/// Result of resolving a group identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLookup {
  /// Exactly one group matched; its members in directory order.
  Found(Vec<UserRecord>),
  NotFound,
  /// More than one group matched the identifier.
  Ambiguous(usize),
}

/// Read-only view of a directory service.
pub trait Directory {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve `identity` (name, account name, principal name, distinguished
  /// name, SID or GUID) to a single group and list its members.
  async fn group_members(
    &self,
    identity: &str,
  ) -> Result<GroupLookup, Self::Error>;

  /// The domain's configured maximum password age, or `None` when the
  /// domain does not define one.
  async fn max_password_age(&self) -> Result<Option<TimeDelta>, Self::Error>;
}
