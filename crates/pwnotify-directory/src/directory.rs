use std::path::PathBuf;

use chrono::TimeDelta;
use pwnotify_core::directory::{Directory, GroupLookup};
use tracing::debug;

use crate::{
  error::{Error, Result},
  snapshot::{Snapshot, max_age_from_interval},
};

/// A [`Directory`] backed by a JSON snapshot file.
///
/// The file is opened, read and closed inside each query, so a snapshot
/// refreshed between runs is always picked up and no handle is held.
#[derive(Debug, Clone)]
pub struct SnapshotDirectory {
  path: PathBuf,
}

impl SnapshotDirectory {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  async fn load(&self) -> Result<Snapshot> {
    let raw = tokio::fs::read(&self.path).await.map_err(|source| Error::Io {
      path: self.path.clone(),
      source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| Error::Json {
      path: self.path.clone(),
      source,
    })
  }
}

impl Directory for SnapshotDirectory {
  type Error = Error;

  async fn group_members(&self, identity: &str) -> Result<GroupLookup> {
    let snapshot = self.load().await?;
    let mut matching = snapshot
      .groups
      .into_iter()
      .filter(|group| group.matches(identity))
      .collect::<Vec<_>>();

    debug!(identity, matches = matching.len(), "group lookup");
    Ok(match matching.len() {
      0 => GroupLookup::NotFound,
      1 => {
        let group = matching.remove(0);
        GroupLookup::Found(group.members.into_iter().map(Into::into).collect())
      }
      n => GroupLookup::Ambiguous(n),
    })
  }

  async fn max_password_age(&self) -> Result<Option<TimeDelta>> {
    let snapshot = self.load().await?;
    Ok(snapshot.max_pwd_age.and_then(max_age_from_interval))
  }
}
