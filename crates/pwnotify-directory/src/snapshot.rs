//! The on-disk shape of a directory export.
//!
//! ```json
//! {
//!   "max_pwd_age": -36288000000000,
//!   "groups": [{
//!     "name": "Staff",
//!     "sam_account_name": "staff",
//!     "distinguished_name": "CN=Staff,OU=Groups,DC=corp,DC=example",
//!     "sid": "S-1-5-21-1004336348-1177238915-682003330-1105",
//!     "guid": "2a7ea5d4-03ab-4f0f-9d0b-7c0ad2cf3c6e",
//!     "members": [{
//!       "display_name": "Alice Liddell",
//!       "email_address": "alice@corp.example",
//!       "last_password_set": "2026-06-21T08:00:00Z",
//!       "password_never_expires": false
//!     }]
//!   }]
//! }
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use pwnotify_core::model::UserRecord;
use serde::Deserialize;

/// 100-nanosecond intervals per microsecond.
const INTERVALS_PER_MICRO: i64 = 10;

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
  /// The domain's `maxPwdAge` attribute: a count of 100-nanosecond intervals,
  /// negative as stored by Active Directory.
  #[serde(default)]
  pub max_pwd_age: Option<i64>,
  #[serde(default)]
  pub groups:      Vec<GroupEntry>,
}

/// A group and every identifier it can be looked up by.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupEntry {
  pub name:                String,
  #[serde(default)]
  pub sam_account_name:    Option<String>,
  #[serde(default)]
  pub user_principal_name: Option<String>,
  #[serde(default)]
  pub distinguished_name:  Option<String>,
  #[serde(default)]
  pub sid:                 Option<String>,
  #[serde(default)]
  pub guid:                Option<String>,
  #[serde(default)]
  pub members:             Vec<MemberEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberEntry {
  #[serde(default)]
  pub display_name:           String,
  #[serde(default)]
  pub email_address:          Option<String>,
  #[serde(default)]
  pub last_password_set:      Option<DateTime<Utc>>,
  #[serde(default)]
  pub password_never_expires: bool,
}

// ─── Matching ────────────────────────────────────────────────────────────────

impl GroupEntry {
  /// Whether `identity` names this group.
  ///
  /// Comparison is case-insensitive; GUIDs also match with or without
  /// surrounding braces.
  pub fn matches(&self, identity: &str) -> bool {
    let identity = identity.trim();
    if identity.is_empty() {
      return false;
    }

    let plain = [
      Some(&self.name),
      self.sam_account_name.as_ref(),
      self.user_principal_name.as_ref(),
      self.distinguished_name.as_ref(),
      self.sid.as_ref(),
    ];
    if plain
      .into_iter()
      .flatten()
      .any(|id| id.eq_ignore_ascii_case(identity))
    {
      return true;
    }

    let identity = strip_braces(identity);
    self
      .guid
      .as_deref()
      .is_some_and(|guid| strip_braces(guid).eq_ignore_ascii_case(identity))
  }
}

fn strip_braces(guid: &str) -> &str {
  guid
    .strip_prefix('{')
    .and_then(|g| g.strip_suffix('}'))
    .unwrap_or(guid)
}

// ─── Conversion ──────────────────────────────────────────────────────────────

impl From<MemberEntry> for UserRecord {
  fn from(entry: MemberEntry) -> Self {
    Self {
      display_name:           entry.display_name,
      email_address:          entry
        .email_address
        .filter(|address| !address.trim().is_empty()),
      last_password_set_at:   entry.last_password_set,
      password_never_expires: entry.password_never_expires,
    }
  }
}

/// Convert a `maxPwdAge` interval count to a duration.
///
/// The sign is ignored. Zero and `i64::MIN` both mean the domain never
/// expires passwords, reported as `None`.
pub fn max_age_from_interval(intervals: i64) -> Option<TimeDelta> {
  if intervals == 0 || intervals == i64::MIN {
    return None;
  }
  let intervals = intervals.abs();
  Some(
    TimeDelta::microseconds(intervals / INTERVALS_PER_MICRO)
      + TimeDelta::nanoseconds((intervals % INTERVALS_PER_MICRO) * 100),
  )
}
