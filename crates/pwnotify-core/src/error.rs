//! Error types for `pwnotify-core`.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error raised by a collaborator (directory or transport backend).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no group found matching {0:?}")]
  GroupNotFound(String),

  #[error("{count} groups match {identity:?}; use a more specific identifier")]
  AmbiguousGroup { identity: String, count: usize },

  #[error("the directory does not define a maximum password age")]
  MaxPasswordAgeUnavailable,

  #[error("could not read the email template {}: {source}", path.display())]
  TemplateUnreadable {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("the email template {} is not valid text in its encoding", path.display())]
  TemplateEncoding { path: PathBuf },

  #[error("directory error: {0}")]
  Directory(#[source] BoxError),
}

impl Error {
  pub(crate) fn directory<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Directory(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
