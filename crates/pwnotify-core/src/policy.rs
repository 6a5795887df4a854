//! Resolution of the maximum password age for a run.

use chrono::TimeDelta;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  directory::Directory,
  model::Policy,
};

/// Parse an operator override as a whole, non-negative number of days.
pub fn parse_override(raw: &str) -> Option<TimeDelta> {
  raw.trim().parse::<u32>().ok().map(|days| TimeDelta::days(i64::from(days)))
}

/// Determine the maximum password age: the override when it parses,
/// otherwise the directory's domain default.
///
/// A directory that cannot answer, or answers with no value, is fatal; no
/// default age is assumed.
pub async fn resolve_max_password_age<D: Directory>(
  override_days: Option<&str>,
  directory: &D,
) -> Result<TimeDelta> {
  if let Some(raw) = override_days {
    match parse_override(raw) {
      Some(age) => {
        debug!(days = age.num_days(), "using maximum password age override");
        return Ok(age);
      }
      None => warn!(
        value = raw,
        "ignoring maximum password age override that is not a whole number \
         of days"
      ),
    }
  }

  let age = directory
    .max_password_age()
    .await
    .map_err(Error::directory)?
    .ok_or(Error::MaxPasswordAgeUnavailable)?;
  debug!(days = age.num_days(), "using domain maximum password age");
  Ok(age)
}

/// Build the run's [`Policy`].
pub async fn resolve_policy<D: Directory>(
  override_days: Option<&str>,
  notification_days: u32,
  directory: &D,
) -> Result<Policy> {
  let max_password_age =
    resolve_max_password_age(override_days, directory).await?;
  Ok(Policy::new(max_password_age, notification_days))
}
