//! Error type for `pwnotify-smtp`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("could not connect to {address}: {source}")]
  Connect {
    address: String,
    #[source]
    source:  std::io::Error,
  },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("timed out waiting for {0}")]
  Timeout(&'static str),

  #[error("connection closed by server")]
  ConnectionClosed,

  /// An envelope address that would break out of its SMTP command or header.
  #[error("invalid email address {0:?}")]
  InvalidAddress(String),

  #[error("malformed server reply: {0:?}")]
  Malformed(String),

  /// The server answered a command with an unexpected status code.
  #[error("{stage} rejected: {code} {message}")]
  Rejected {
    stage:   &'static str,
    code:    u16,
    message: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
