//! Single-message delivery with the failure captured as data.

use tracing::{error, info};

use crate::{
  model::{DeliveryOutcome, RenderedMessage},
  transport::MailTransport,
};

/// Hand `message` to `transport` once and report what happened.
///
/// Transport errors never escape: they become a failed [`DeliveryOutcome`]
/// so the caller decides whether the run continues.
pub async fn dispatch<T: MailTransport>(
  transport: &T,
  sender: &str,
  message: &RenderedMessage,
) -> DeliveryOutcome {
  match transport.send(sender, message).await {
    Ok(()) => {
      info!(recipient = %message.recipient, "notification sent");
      DeliveryOutcome::delivered(&message.recipient)
    }
    Err(e) => {
      error!(recipient = %message.recipient, error = %e, "failed to send notification");
      DeliveryOutcome::failed(&message.recipient, e.to_string())
    }
  }
}
