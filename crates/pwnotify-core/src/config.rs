//! Run configuration consumed by the pipeline.
//!
//! Built once by the binary from CLI flags, environment and config file, then
//! passed by reference to every component.

use std::path::PathBuf;

use serde::Deserialize;

/// Subject template used when none is configured.
pub const DEFAULT_SUBJECT: &str = "Your password is about to expire!";

/// What to do when a delivery fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
  /// Record the failure and move on to the next recipient.
  #[default]
  Continue,
  /// Stop the run after the first failed delivery.
  Abort,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
  /// Identifier of the group whose members are checked.
  pub group:                     String,
  pub notification_days:         u32,
  pub template_path:             PathBuf,
  pub sender:                    String,
  /// Subject line template; tokens are substituted like the body.
  pub subject:                   String,
  /// Operator-supplied maximum password age in days, unparsed.
  pub max_password_age_override: Option<String>,
  /// When set, every message goes here instead of the member's own address.
  pub test_recipient:            Option<String>,
  pub failure_policy:            FailurePolicy,
}

impl RunConfig {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    group: impl Into<String>,
    notification_days: u32,
    template_path: impl Into<PathBuf>,
    sender: impl Into<String>,
  ) -> Self {
    Self {
      group: group.into(),
      notification_days,
      template_path: template_path.into(),
      sender: sender.into(),
      subject: DEFAULT_SUBJECT.to_string(),
      max_password_age_override: None,
      test_recipient: None,
      failure_policy: FailurePolicy::default(),
    }
  }
}
