//! One notification run, end to end.
//!
//! The coordinator resolves the policy, enumerates the group, evaluates each
//! member, and for every eligible member renders and dispatches a message.
//! Lookup and configuration problems are returned as errors; delivery
//! problems are collected into the [`RunReport`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
  Error, Result,
  config::{FailurePolicy, RunConfig},
  directory::{Directory, GroupLookup},
  dispatch::dispatch,
  eligibility::collect_targets,
  model::{DeliveryOutcome, NotificationTarget, RenderedMessage, UserRecord},
  policy::resolve_policy,
  template::{load_template, render},
  transport::MailTransport,
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Summary of a completed (or aborted) run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub members_scanned: usize,
  pub eligible:        usize,
  /// One entry per attempted delivery, in dispatch order.
  pub outcomes:        Vec<DeliveryOutcome>,
  /// Set when [`FailurePolicy::Abort`] stopped the run early.
  pub aborted:         bool,
}

impl RunReport {
  pub fn sent(&self) -> usize {
    self.outcomes.iter().filter(|o| o.succeeded).count()
  }

  pub fn failed(&self) -> usize {
    self.outcomes.iter().filter(|o| !o.succeeded).count()
  }

  /// `true` when every eligible member was notified.
  pub fn is_success(&self) -> bool {
    !self.aborted && self.failed() == 0
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct RunCoordinator<'a, D, T> {
  config:    &'a RunConfig,
  directory: &'a D,
  transport: &'a T,
}

impl<'a, D, T> RunCoordinator<'a, D, T>
where
  D: Directory,
  T: MailTransport,
{
  pub fn new(config: &'a RunConfig, directory: &'a D, transport: &'a T) -> Self {
    Self { config, directory, transport }
  }

  /// Execute the run with `now` as the reference time.
  pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport> {
    let config = self.config;

    let policy = resolve_policy(
      config.max_password_age_override.as_deref(),
      config.notification_days,
      self.directory,
    )
    .await?;
    info!(
      group = %config.group,
      max_password_age_days = policy.max_password_age.num_days(),
      notification_days = policy.notification_threshold,
      "policy resolved"
    );

    let members = self.members().await?;
    let targets = collect_targets(&members, &policy, now);
    info!(
      members = members.len(),
      eligible = targets.len(),
      "found {} users whose password expires in {} days or less",
      targets.len(),
      policy.notification_threshold
    );

    let mut report = RunReport {
      members_scanned: members.len(),
      eligible: targets.len(),
      ..RunReport::default()
    };
    if targets.is_empty() {
      return Ok(report);
    }

    let body_template = load_template(&config.template_path)?;

    for target in &targets {
      let outcome = self.notify(target, &body_template).await;
      let failed = !outcome.succeeded;
      report.outcomes.push(outcome);

      if failed && config.failure_policy == FailurePolicy::Abort {
        warn!(
          remaining = targets.len() - report.outcomes.len(),
          "aborting run after failed delivery"
        );
        report.aborted = true;
        break;
      }
    }

    Ok(report)
  }

  async fn members(&self) -> Result<Vec<UserRecord>> {
    let identity = &self.config.group;
    match self
      .directory
      .group_members(identity)
      .await
      .map_err(Error::directory)?
    {
      GroupLookup::Found(members) => Ok(members),
      GroupLookup::NotFound => Err(Error::GroupNotFound(identity.clone())),
      GroupLookup::Ambiguous(count) => Err(Error::AmbiguousGroup {
        identity: identity.clone(),
        count,
      }),
    }
  }

  async fn notify(
    &self,
    target: &NotificationTarget,
    body_template: &str,
  ) -> DeliveryOutcome {
    let recipient = self
      .config
      .test_recipient
      .as_ref()
      .or(target.email_address.as_ref());
    let Some(recipient) = recipient else {
      error!(name = %target.name, "member has no email address");
      return DeliveryOutcome::failed(
        &target.name,
        "member has no email address",
      );
    };

    let message = RenderedMessage {
      subject:   render(&self.config.subject, target),
      body:      render(body_template, target),
      recipient: recipient.clone(),
    };
    info!(
      name = %target.name,
      recipient = %message.recipient,
      days_left = target.days_left,
      "sending notification"
    );
    dispatch(self.transport, &self.config.sender, &message).await
  }
}
