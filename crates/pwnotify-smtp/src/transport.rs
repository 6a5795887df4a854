use chrono::Utc;
use pwnotify_core::{model::RenderedMessage, transport::MailTransport};
use tracing::warn;

use crate::{
  client::SmtpClient,
  config::SmtpConfig,
  error::{Error, Result},
  message::format_message,
};

/// [`MailTransport`] that opens a fresh SMTP session for every message.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
  config: SmtpConfig,
}

impl SmtpTransport {
  pub fn new(config: SmtpConfig) -> Self { Self { config } }

  pub fn config(&self) -> &SmtpConfig { &self.config }

  async fn submit(
    &self,
    client: &mut SmtpClient,
    sender: &str,
    message: &RenderedMessage,
  ) -> Result<()> {
    client.greeting().await?;
    let hello = client.hello(&self.config.helo_name).await?;

    if let Some(credentials) = &self.config.credentials {
      if !hello.has_extension("AUTH") {
        warn!(host = %self.config.host, "server does not advertise AUTH; trying anyway");
      }
      client.auth_plain(credentials).await?;
    }

    client.mail_from(sender).await?;
    client.rcpt_to(&message.recipient).await?;
    client
      .data(&format_message(sender, message, Utc::now()))
      .await?;
    Ok(())
  }
}

impl MailTransport for SmtpTransport {
  type Error = Error;

  async fn send(&self, sender: &str, message: &RenderedMessage) -> Result<()> {
    check_address(sender)?;
    check_address(&message.recipient)?;

    let mut client = SmtpClient::connect(&self.config).await?;
    let result = self.submit(&mut client, sender, message).await;
    // QUIT on every path, including a rejected transaction.
    client.quit().await;
    result
  }
}

/// Reject addresses that could end the `MAIL FROM`/`RCPT TO` argument or a
/// header line early.
fn check_address(address: &str) -> Result<()> {
  let address_ok = !address.trim().is_empty()
    && !address.contains(['\r', '\n', '<', '>']);
  if address_ok {
    Ok(())
  } else {
    Err(Error::InvalidAddress(address.to_string()))
  }
}
