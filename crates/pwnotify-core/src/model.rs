//! Records flowing through one notification run.
//!
//! Directory members come in as [`UserRecord`]s, eligible members become
//! [`NotificationTarget`]s, and every delivery attempt leaves a
//! [`DeliveryOutcome`]. Nothing here outlives the run.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Expiry rules applied to every member in a run. Resolved once, then
/// read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
  /// How long a password stays valid after it was last set.
  pub max_password_age:       TimeDelta,
  /// Members whose password expires in fewer than this many days are
  /// notified.
  pub notification_threshold: u32,
}

impl Policy {
  pub fn new(max_password_age: TimeDelta, notification_threshold: u32) -> Self {
    Self { max_password_age, notification_threshold }
  }

  /// The notification window as a duration.
  pub fn window(&self) -> TimeDelta {
    TimeDelta::days(i64::from(self.notification_threshold))
  }
}

// ─── Directory input ─────────────────────────────────────────────────────────

/// A group member as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
  pub display_name:           String,
  pub email_address:          Option<String>,
  /// `None` when the password has never been set (or must change at next
  /// logon).
  pub last_password_set_at:   Option<DateTime<Utc>>,
  pub password_never_expires: bool,
}

// ─── Derived ─────────────────────────────────────────────────────────────────

/// A member inside the notification window, with the remaining time broken
/// down for the message template.
///
/// All three counters carry the sign of the remaining time, so an expired
/// password yields negative values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
  pub name:             String,
  pub email_address:    Option<String>,
  /// Whole days remaining, truncated toward zero.
  pub days_left:        i64,
  /// Hours remaining after whole days, truncated toward zero.
  pub hours_left:       i64,
  /// Total hours remaining, rounded down.
  pub total_hours_left: i64,
}

/// A message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
  pub subject:   String,
  pub body:      String,
  pub recipient: String,
}

/// The result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
  pub recipient:    String,
  pub succeeded:    bool,
  pub error_detail: Option<String>,
}

impl DeliveryOutcome {
  pub fn delivered(recipient: impl Into<String>) -> Self {
    Self { recipient: recipient.into(), succeeded: true, error_detail: None }
  }

  pub fn failed(recipient: impl Into<String>, detail: impl Into<String>) -> Self {
    Self {
      recipient:    recipient.into(),
      succeeded:    false,
      error_detail: Some(detail.into()),
    }
  }
}
