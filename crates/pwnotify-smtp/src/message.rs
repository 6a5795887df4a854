//! RFC 5322 message formatting for the `DATA` phase.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use pwnotify_core::model::RenderedMessage;
use uuid::Uuid;

/// Build the `DATA` payload for `message`: headers, a blank line and the
/// body, with CRLF line endings and dot-stuffing applied. The terminating
/// `.` line is not included.
pub fn format_message(
  sender: &str,
  message: &RenderedMessage,
  date: DateTime<Utc>,
) -> String {
  let mut out = String::with_capacity(message.body.len() + 512);

  push_header(&mut out, "From", sender);
  push_header(&mut out, "To", &message.recipient);
  push_header(&mut out, "Subject", &encode_header_text(&message.subject));
  push_header(&mut out, "Date", &date.to_rfc2822());
  push_header(&mut out, "Message-ID", &message_id(sender));
  push_header(&mut out, "MIME-Version", "1.0");
  push_header(&mut out, "Content-Type", "text/plain; charset=utf-8");
  push_header(&mut out, "Content-Transfer-Encoding", "8bit");
  out.push_str("\r\n");

  // A single trailing newline ends the last line rather than adding one.
  let body = message
    .body
    .strip_suffix('\n')
    .map(|b| b.strip_suffix('\r').unwrap_or(b))
    .unwrap_or(message.body.as_str());
  for line in body.split('\n') {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.starts_with('.') {
      out.push('.');
    }
    out.push_str(line);
    out.push_str("\r\n");
  }

  out
}

/// Line breaks inside `value` are flattened to spaces so a value can never
/// start a header of its own.
fn push_header(out: &mut String, name: &str, value: &str) {
  out.push_str(name);
  out.push_str(": ");
  out.extend(
    value
      .chars()
      .map(|c| if matches!(c, '\r' | '\n') { ' ' } else { c }),
  );
  out.push_str("\r\n");
}

/// Header text as-is when it is printable ASCII, otherwise as a single
/// RFC 2047 base64 encoded-word. Line breaks are flattened to spaces.
fn encode_header_text(text: &str) -> String {
  let flat = text.replace(['\r', '\n'], " ");
  if flat.bytes().all(|b| (0x20..0x7f).contains(&b)) {
    flat
  } else {
    format!("=?utf-8?B?{}?=", STANDARD.encode(flat.as_bytes()))
  }
}

fn message_id(sender: &str) -> String {
  let domain = sender
    .rsplit_once('@')
    .map(|(_, domain)| domain.trim_end_matches('>'))
    .filter(|domain| !domain.is_empty())
    .unwrap_or("localhost");
  format!("<{}@{}>", Uuid::new_v4(), domain)
}
