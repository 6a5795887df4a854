//! Connection settings for the SMTP transport.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 25;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username and password for `AUTH PLAIN`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
  pub host:        String,
  pub port:        u16,
  /// Name announced in `EHLO`/`HELO`.
  pub helo_name:   String,
  pub credentials: Option<Credentials>,
  /// Upper bound for connecting and for each command round-trip.
  pub timeout:     Duration,
}

impl SmtpConfig {
  /// Settings for `host` on the default port, without authentication.
  pub fn new(host: impl Into<String>) -> Self {
    Self {
      host:        host.into(),
      port:        DEFAULT_PORT,
      helo_name:   "localhost".to_string(),
      credentials: None,
      timeout:     DEFAULT_TIMEOUT,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
