//! In-process SMTP server that records what a client sends.
#![allow(dead_code)] // Not every test uses every knob.

use std::{
  net::SocketAddr,
  sync::{Arc, Mutex},
};

use tokio::{
  io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
  net::{TcpListener, TcpStream},
  task::JoinHandle,
};

/// A command (or message body) received by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
  Ehlo(String),
  Helo(String),
  Auth(String),
  MailFrom(String),
  RcptTo(String),
  Data,
  /// Everything between `DATA` and the terminating `.` line, as sent.
  MessageContent(String),
  Quit,
  Other(String),
}

#[derive(Clone)]
struct Responses {
  greeting:  String,
  ehlo:      String,
  helo:      String,
  auth:      String,
  mail_from: String,
  rcpt_to:   String,
  data:      String,
  data_end:  String,
}

impl Default for Responses {
  fn default() -> Self {
    Self {
      greeting:  "220 mock.example ESMTP ready\r\n".into(),
      ehlo:      "250-mock.example\r\n250-SIZE 10240000\r\n250 AUTH PLAIN\r\n".into(),
      helo:      "250 mock.example\r\n".into(),
      auth:      "235 2.7.0 Authentication successful\r\n".into(),
      mail_from: "250 2.1.0 OK\r\n".into(),
      rcpt_to:   "250 2.1.5 OK\r\n".into(),
      data:      "354 End data with <CR><LF>.<CR><LF>\r\n".into(),
      data_end:  "250 2.0.0 Queued\r\n".into(),
    }
  }
}

#[derive(Default)]
pub struct MockSmtpServerBuilder {
  responses: Responses,
}

impl MockSmtpServerBuilder {
  pub fn reject_ehlo(mut self) -> Self {
    self.responses.ehlo = "502 5.5.2 Command not recognized\r\n".into();
    self
  }

  pub fn with_auth_response(mut self, code: u16, text: &str) -> Self {
    self.responses.auth = format!("{code} {text}\r\n");
    self
  }

  pub fn with_rcpt_to_response(mut self, code: u16, text: &str) -> Self {
    self.responses.rcpt_to = format!("{code} {text}\r\n");
    self
  }

  pub fn with_greeting(mut self, code: u16, text: &str) -> Self {
    self.responses.greeting = format!("{code} {text}\r\n");
    self
  }

  pub async fn build(self) -> MockSmtpServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");
    let commands = Arc::new(Mutex::new(Vec::new()));

    let responses = Arc::new(self.responses);
    let recorded = Arc::clone(&commands);
    let handle = tokio::spawn(async move {
      while let Ok((stream, _)) = listener.accept().await {
        let responses = Arc::clone(&responses);
        let recorded = Arc::clone(&recorded);
        tokio::spawn(async move {
          let _ = handle_connection(stream, &responses, &recorded).await;
        });
      }
    });

    MockSmtpServer { addr, commands, handle }
  }
}

pub struct MockSmtpServer {
  addr:     SocketAddr,
  commands: Arc<Mutex<Vec<SmtpCommand>>>,
  handle:   JoinHandle<()>,
}

impl MockSmtpServer {
  pub fn builder() -> MockSmtpServerBuilder { MockSmtpServerBuilder::default() }

  pub fn addr(&self) -> SocketAddr { self.addr }

  pub fn commands(&self) -> Vec<SmtpCommand> {
    self.commands.lock().expect("commands lock").clone()
  }
}

impl Drop for MockSmtpServer {
  fn drop(&mut self) { self.handle.abort(); }
}

async fn handle_connection(
  stream: TcpStream,
  responses: &Responses,
  recorded: &Mutex<Vec<SmtpCommand>>,
) -> std::io::Result<()> {
  let mut stream = BufReader::new(stream);
  let record = |cmd: SmtpCommand| recorded.lock().expect("commands lock").push(cmd);

  stream.get_mut().write_all(responses.greeting.as_bytes()).await?;
  if !responses.greeting.starts_with("220") {
    return Ok(());
  }

  loop {
    let mut line = String::new();
    if stream.read_line(&mut line).await? == 0 {
      return Ok(());
    }
    let line = line.trim_end().to_string();
    let upper = line.to_ascii_uppercase();
    let arg = |prefix: &str| {
      line[prefix.len()..]
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
    };

    let reply: &str = if upper.starts_with("EHLO ") {
      record(SmtpCommand::Ehlo(arg("EHLO ")));
      &responses.ehlo
    } else if upper.starts_with("HELO ") {
      record(SmtpCommand::Helo(arg("HELO ")));
      &responses.helo
    } else if upper.starts_with("AUTH ") {
      record(SmtpCommand::Auth(arg("AUTH ")));
      &responses.auth
    } else if upper.starts_with("MAIL FROM:") {
      record(SmtpCommand::MailFrom(arg("MAIL FROM:")));
      &responses.mail_from
    } else if upper.starts_with("RCPT TO:") {
      record(SmtpCommand::RcptTo(arg("RCPT TO:")));
      &responses.rcpt_to
    } else if upper == "DATA" {
      record(SmtpCommand::Data);
      stream.get_mut().write_all(responses.data.as_bytes()).await?;
      let mut content = String::new();
      loop {
        let mut data_line = String::new();
        if stream.read_line(&mut data_line).await? == 0 {
          return Ok(());
        }
        if data_line == ".\r\n" {
          break;
        }
        content.push_str(&data_line);
      }
      record(SmtpCommand::MessageContent(content));
      &responses.data_end
    } else if upper == "QUIT" {
      record(SmtpCommand::Quit);
      stream.get_mut().write_all(b"221 2.0.0 Bye\r\n").await?;
      return Ok(());
    } else {
      record(SmtpCommand::Other(line.clone()));
      "502 5.5.2 Command not recognized\r\n"
    };

    stream.get_mut().write_all(reply.as_bytes()).await?;
  }
}
