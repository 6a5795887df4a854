//! `SmtpTransport` against the in-process mock server.

mod support;

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use pwnotify_core::{model::RenderedMessage, transport::MailTransport};
use pwnotify_smtp::{Credentials, Error, SmtpConfig, SmtpTransport};
use support::mock_server::{MockSmtpServer, SmtpCommand};

fn transport_for(server: &MockSmtpServer) -> SmtpTransport {
  let mut config = SmtpConfig::new(server.addr().ip().to_string());
  config.port = server.addr().port();
  config.helo_name = "pwnotify.test".into();
  config.timeout = Duration::from_secs(5);
  SmtpTransport::new(config)
}

fn message() -> RenderedMessage {
  RenderedMessage {
    subject:   "Your password expires in 2 days".into(),
    body:      "Hi Alice,\n.please change it.\n".into(),
    recipient: "alice@example.com".into(),
  }
}

#[tokio::test]
async fn delivers_a_message() {
  let server = MockSmtpServer::builder().build().await;
  let transport = transport_for(&server);

  transport.send("it@corp.example", &message()).await.unwrap();

  let commands = server.commands();
  assert_eq!(commands[0], SmtpCommand::Ehlo("pwnotify.test".into()));
  assert_eq!(commands[1], SmtpCommand::MailFrom("it@corp.example".into()));
  assert_eq!(commands[2], SmtpCommand::RcptTo("alice@example.com".into()));
  assert_eq!(commands[3], SmtpCommand::Data);
  let SmtpCommand::MessageContent(content) = &commands[4] else {
    panic!("expected message content, got {:?}", commands[4]);
  };
  assert!(content.contains("Subject: Your password expires in 2 days\r\n"));
  assert!(content.ends_with("\r\n\r\nHi Alice,\r\n..please change it.\r\n"));
  assert_eq!(commands[5], SmtpCommand::Quit);
  assert_eq!(commands.len(), 6);
}

#[tokio::test]
async fn falls_back_to_helo() {
  let server = MockSmtpServer::builder().reject_ehlo().build().await;
  let transport = transport_for(&server);

  transport.send("it@corp.example", &message()).await.unwrap();

  let commands = server.commands();
  assert!(matches!(commands[0], SmtpCommand::Ehlo(_)));
  assert_eq!(commands[1], SmtpCommand::Helo("pwnotify.test".into()));
  assert!(commands.contains(&SmtpCommand::Quit));
}

#[tokio::test]
async fn authenticates_with_plain() {
  let server = MockSmtpServer::builder().build().await;
  let mut transport = transport_for(&server);
  let mut config = transport.config().clone();
  config.credentials = Some(Credentials {
    username: "relay".into(),
    password: "hunter2".into(),
  });
  transport = SmtpTransport::new(config);

  transport.send("it@corp.example", &message()).await.unwrap();

  let token = STANDARD.encode("\0relay\0hunter2");
  assert_eq!(server.commands()[1], SmtpCommand::Auth(format!("PLAIN {token}")));
}

#[tokio::test]
async fn failed_authentication_is_reported_and_session_closed() {
  let server = MockSmtpServer::builder()
    .with_auth_response(535, "5.7.8 Authentication credentials invalid")
    .build()
    .await;
  let mut config = transport_for(&server).config().clone();
  config.credentials = Some(Credentials {
    username: "relay".into(),
    password: "wrong".into(),
  });
  let transport = SmtpTransport::new(config);

  let err = transport.send("it@corp.example", &message()).await.unwrap_err();
  assert!(matches!(err, Error::Rejected { stage: "AUTH", code: 535, .. }));

  let commands = server.commands();
  assert!(!commands.iter().any(|c| matches!(c, SmtpCommand::MailFrom(_))));
  assert_eq!(commands.last(), Some(&SmtpCommand::Quit));
}

#[tokio::test]
async fn rejected_recipient_is_an_error() {
  let server = MockSmtpServer::builder()
    .with_rcpt_to_response(550, "5.1.1 No such user")
    .build()
    .await;
  let transport = transport_for(&server);

  let err = transport.send("it@corp.example", &message()).await.unwrap_err();
  match &err {
    Error::Rejected { stage, code, message } => {
      assert_eq!(*stage, "RCPT TO");
      assert_eq!(*code, 550);
      assert_eq!(message, "5.1.1 No such user");
    }
    other => panic!("unexpected error {other:?}"),
  }
  assert!(err.to_string().contains("550"));

  let commands = server.commands();
  assert!(!commands.contains(&SmtpCommand::Data));
  assert_eq!(commands.last(), Some(&SmtpCommand::Quit));
}

#[tokio::test]
async fn unavailable_service_greeting_is_an_error() {
  let server = MockSmtpServer::builder()
    .with_greeting(554, "No SMTP service here")
    .build()
    .await;
  let transport = transport_for(&server);

  let err = transport.send("it@corp.example", &message()).await.unwrap_err();
  assert!(matches!(err, Error::Rejected { stage: "greeting", code: 554, .. }));
}

#[tokio::test]
async fn connection_refused_is_a_connect_error() {
  // Bind and immediately drop to get a port nobody listens on.
  let port = {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
  };
  let mut config = SmtpConfig::new("127.0.0.1");
  config.port = port;
  config.timeout = Duration::from_secs(5);

  let err = SmtpTransport::new(config)
    .send("it@corp.example", &message())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Connect { .. }));
}

#[tokio::test]
async fn smuggled_recipient_is_refused_before_connecting() {
  let server = MockSmtpServer::builder().build().await;
  let transport = transport_for(&server);
  let mut smuggled = message();
  smuggled.recipient = "alice@example.com>\r\nRCPT TO:<mallory@evil.example".into();

  let err = transport.send("it@corp.example", &smuggled).await.unwrap_err();
  assert!(matches!(err, Error::InvalidAddress(_)));
  assert!(server.commands().is_empty());
}

#[tokio::test]
async fn sender_with_line_break_is_refused() {
  let server = MockSmtpServer::builder().build().await;
  let transport = transport_for(&server);

  let err = transport
    .send("it@corp.example\r\nRSET", &message())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidAddress(_)));
  assert!(server.commands().is_empty());
}

#[tokio::test]
async fn endless_reply_line_is_malformed_not_buffered() {
  use tokio::{io::AsyncWriteExt, net::TcpListener};

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let server = tokio::spawn(async move {
    let (mut stream, _) = listener.accept().await.unwrap();
    // A greeting that never ends, then the socket is held open.
    let _ = stream.write_all(&vec![b'2'; 64 * 1024]).await;
    tokio::time::sleep(Duration::from_secs(30)).await;
  });

  let mut config = SmtpConfig::new(addr.ip().to_string());
  config.port = addr.port();
  config.timeout = Duration::from_secs(10);

  let started = std::time::Instant::now();
  let err = SmtpTransport::new(config)
    .send("it@corp.example", &message())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Malformed(_)), "got {err:?}");
  assert!(started.elapsed() < Duration::from_secs(10));
  server.abort();
}
