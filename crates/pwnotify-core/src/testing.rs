//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};

use chrono::TimeDelta;
use thiserror::Error;

use crate::{
  directory::{Directory, GroupLookup},
  model::RenderedMessage,
  transport::MailTransport,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

// ─── Directory ───────────────────────────────────────────────────────────────

pub struct FakeDirectory {
  lookup:          GroupLookup,
  max_age:         Option<TimeDelta>,
  failing:         bool,
  lookups:         Cell<usize>,
  max_age_queries: Cell<usize>,
}

impl Default for FakeDirectory {
  fn default() -> Self {
    Self {
      lookup:          GroupLookup::NotFound,
      max_age:         None,
      failing:         false,
      lookups:         Cell::new(0),
      max_age_queries: Cell::new(0),
    }
  }
}

impl FakeDirectory {
  pub fn with_lookup(mut self, lookup: GroupLookup) -> Self {
    self.lookup = lookup;
    self
  }

  pub fn with_max_age(mut self, age: TimeDelta) -> Self {
    self.max_age = Some(age);
    self
  }

  pub fn failing(mut self) -> Self {
    self.failing = true;
    self
  }

  pub fn lookups(&self) -> usize { self.lookups.get() }

  pub fn max_age_queries(&self) -> usize { self.max_age_queries.get() }
}

impl Directory for FakeDirectory {
  type Error = FakeError;

  async fn group_members(
    &self,
    _identity: &str,
  ) -> Result<GroupLookup, Self::Error> {
    self.lookups.set(self.lookups.get() + 1);
    if self.failing {
      return Err(FakeError("directory offline".into()));
    }
    Ok(self.lookup.clone())
  }

  async fn max_password_age(&self) -> Result<Option<TimeDelta>, Self::Error> {
    self.max_age_queries.set(self.max_age_queries.get() + 1);
    if self.failing {
      return Err(FakeError("directory offline".into()));
    }
    Ok(self.max_age)
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// Records every accepted message; rejects recipients listed with
/// [`FakeTransport::reject`].
#[derive(Default)]
pub struct FakeTransport {
  rejected: Vec<String>,
  sent:     RefCell<Vec<(String, RenderedMessage)>>,
  attempts: Cell<usize>,
}

impl FakeTransport {
  pub fn reject(mut self, recipient: &str) -> Self {
    self.rejected.push(recipient.to_string());
    self
  }

  pub fn sent(&self) -> Vec<(String, RenderedMessage)> {
    self.sent.borrow().clone()
  }

  pub fn attempts(&self) -> usize { self.attempts.get() }
}

impl MailTransport for FakeTransport {
  type Error = FakeError;

  async fn send(
    &self,
    sender: &str,
    message: &RenderedMessage,
  ) -> Result<(), Self::Error> {
    self.attempts.set(self.attempts.get() + 1);
    if self.rejected.contains(&message.recipient) {
      return Err(FakeError(format!(
        "550 mailbox unavailable: {}",
        message.recipient
      )));
    }
    self
      .sent
      .borrow_mut()
      .push((sender.to_string(), message.clone()));
    Ok(())
  }
}
