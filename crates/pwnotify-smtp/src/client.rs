//! A single SMTP session over plain TCP.

use std::{future::Future, time::Duration};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tokio::{
  io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
  net::TcpStream,
  time::timeout,
};
use tracing::{debug, warn};

use crate::{
  config::{Credentials, SmtpConfig},
  error::{Error, Result},
  reply::{Reply, parse_line},
};

/// Longest reply line accepted before the server is considered broken.
const MAX_LINE_LEN: usize = 4096;

/// An open SMTP session. Dropping it closes the socket.
pub(crate) struct SmtpClient {
  stream:  BufReader<TcpStream>,
  timeout: Duration,
}

impl SmtpClient {
  /// Open a TCP connection to the configured server.
  pub async fn connect(config: &SmtpConfig) -> Result<Self> {
    let connect = TcpStream::connect((config.host.as_str(), config.port));
    let stream = timeout(config.timeout, connect)
      .await
      .map_err(|_| Error::Timeout("connection"))?
      .map_err(|source| Error::Connect { address: config.address(), source })?;

    debug!(address = %config.address(), "connected to SMTP server");
    Ok(Self { stream: BufReader::new(stream), timeout: config.timeout })
  }

  // ── Session phases ────────────────────────────────────────────────────

  pub async fn greeting(&mut self) -> Result<Reply> {
    self.read_reply("greeting").await?.expect("greeting", &[220])
  }

  /// `EHLO`, falling back to `HELO` for servers that reject it.
  pub async fn hello(&mut self, name: &str) -> Result<Reply> {
    let ehlo = self.command("EHLO", &format!("EHLO {name}")).await?;
    if ehlo.code == 250 {
      return Ok(ehlo);
    }
    debug!(code = ehlo.code, "EHLO refused, trying HELO");
    self
      .command("HELO", &format!("HELO {name}"))
      .await?
      .expect("HELO", &[250])
  }

  /// `AUTH PLAIN` with an initial response (RFC 4616).
  pub async fn auth_plain(&mut self, credentials: &Credentials) -> Result<()> {
    let token = STANDARD.encode(format!(
      "\0{}\0{}",
      credentials.username, credentials.password
    ));
    self.send_line(&format!("AUTH PLAIN {token}")).await?;
    self.read_reply("AUTH").await?.expect("AUTH", &[235])?;
    Ok(())
  }

  pub async fn mail_from(&mut self, sender: &str) -> Result<()> {
    self
      .command("MAIL FROM", &format!("MAIL FROM:<{sender}>"))
      .await?
      .expect("MAIL FROM", &[250])?;
    Ok(())
  }

  pub async fn rcpt_to(&mut self, recipient: &str) -> Result<()> {
    self
      .command("RCPT TO", &format!("RCPT TO:<{recipient}>"))
      .await?
      .expect("RCPT TO", &[250, 251])?;
    Ok(())
  }

  /// `DATA`, the already dot-stuffed payload, and the end-of-data marker.
  pub async fn data(&mut self, payload: &str) -> Result<Reply> {
    self.command("DATA", "DATA").await?.expect("DATA", &[354])?;

    let mut wire = String::with_capacity(payload.len() + 5);
    wire.push_str(payload);
    if !wire.ends_with("\r\n") {
      wire.push_str("\r\n");
    }
    wire.push_str(".\r\n");
    self.write_all("message data", wire.as_bytes()).await?;

    self.read_reply("end of data").await?.expect("message", &[250])
  }

  /// Say goodbye. Failures are logged only; the socket is closed either way
  /// when `self` is dropped.
  pub async fn quit(mut self) {
    match self.command("QUIT", "QUIT").await {
      Ok(reply) => debug!(code = reply.code, "QUIT"),
      Err(e) => warn!(error = %e, "SMTP QUIT failed"),
    }
    let _ = self.stream.get_mut().shutdown().await;
  }

  // ── Wire helpers ──────────────────────────────────────────────────────

  async fn command(&mut self, stage: &'static str, line: &str) -> Result<Reply> {
    self.send_line(line).await?;
    self.read_reply(stage).await
  }

  async fn send_line(&mut self, line: &str) -> Result<()> {
    if line.starts_with("AUTH ") {
      debug!("C: AUTH <redacted>");
    } else {
      debug!("C: {line}");
    }
    let wire = format!("{line}\r\n");
    self.write_all("command", wire.as_bytes()).await
  }

  async fn write_all(&mut self, what: &'static str, bytes: &[u8]) -> Result<()> {
    let stream = self.stream.get_mut();
    with_timeout(self.timeout, what, async {
      stream.write_all(bytes).await?;
      stream.flush().await?;
      Ok::<_, Error>(())
    })
    .await
  }

  async fn read_reply(&mut self, stage: &'static str) -> Result<Reply> {
    let mut code = None;
    let mut lines = Vec::new();

    loop {
      let mut raw = String::new();
      // One byte past the limit is enough to tell an overlong line apart.
      let mut limited = (&mut self.stream).take(MAX_LINE_LEN as u64 + 1);
      let read = with_timeout(self.timeout, stage, async {
        Ok::<_, Error>(limited.read_line(&mut raw).await?)
      })
      .await?;
      if read == 0 {
        return Err(Error::ConnectionClosed);
      }
      if raw.len() > MAX_LINE_LEN {
        return Err(Error::Malformed(format!("{} byte reply line", raw.len())));
      }

      let line = parse_line(&raw)?;
      debug!("S: {} {}", line.code, line.text);
      match code {
        None => code = Some(line.code),
        Some(c) if c != line.code => {
          return Err(Error::Malformed(raw.trim_end().to_string()));
        }
        Some(_) => {}
      }
      lines.push(line.text.to_string());

      if line.last {
        return Ok(Reply { code: line.code, lines });
      }
    }
  }
}

async fn with_timeout<T>(
  limit: Duration,
  what: &'static str,
  fut: impl Future<Output = Result<T>>,
) -> Result<T> {
  timeout(limit, fut).await.map_err(|_| Error::Timeout(what))?
}
