//! Which members are inside the notification window, and by how much.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{NotificationTarget, Policy, UserRecord};

/// Decide whether `user` should be notified at `now`.
///
/// Returns `None` for members whose password never expires, who have no
/// last-set timestamp, or whose remaining time is at least the notification
/// threshold. Already-expired passwords are included with negative counters.
pub fn evaluate(
  user: &UserRecord,
  policy: &Policy,
  now: DateTime<Utc>,
) -> Option<NotificationTarget> {
  if user.password_never_expires {
    return None;
  }
  let last_set = user.last_password_set_at?;

  // An expiry past chrono's range is not in any window.
  let expires_at = last_set.checked_add_signed(policy.max_password_age)?;
  let remaining = expires_at - now;

  if remaining >= policy.window() {
    return None;
  }

  Some(NotificationTarget {
    name:             user.display_name.clone(),
    email_address:    user.email_address.clone(),
    days_left:        remaining.num_days(),
    hours_left:       remaining.num_hours() % 24,
    total_hours_left: floor_hours(remaining),
  })
}

/// Evaluate every member, keeping directory order.
pub fn collect_targets<'a>(
  users: impl IntoIterator<Item = &'a UserRecord>,
  policy: &Policy,
  now: DateTime<Utc>,
) -> Vec<NotificationTarget> {
  users
    .into_iter()
    .filter_map(|user| evaluate(user, policy, now))
    .collect()
}

/// Whole hours in `delta`, rounded toward negative infinity.
fn floor_hours(delta: TimeDelta) -> i64 {
  let truncated = delta.num_hours();
  if TimeDelta::hours(truncated) > delta {
    truncated - 1
  } else {
    truncated
  }
}
