//! The `MailTransport` trait: the sink rendered messages are handed to.

use crate::model::RenderedMessage;

/// Delivers one message per call.
///
/// Implementations acquire and release their connection inside `send`; no
/// state is carried between calls.
pub trait MailTransport {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Attempt a single delivery of `message` from `sender`. No retries.
  async fn send(
    &self,
    sender: &str,
    message: &RenderedMessage,
  ) -> Result<(), Self::Error>;
}
