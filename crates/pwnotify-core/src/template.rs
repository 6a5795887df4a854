//! Message templates: loading the body template and substituting per-member
//! tokens.
//!
//! Recognised tokens are `{Name}`, `{DaysLeft}`, `{HoursLeft}` and
//! `{TotalHoursLeft}`. Anything else in braces is left untouched.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::{Error, Result, model::NotificationTarget};

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
  Name,
  DaysLeft,
  HoursLeft,
  TotalHoursLeft,
}

impl Token {
  const ALL: [Token; 4] =
    [Self::Name, Self::DaysLeft, Self::HoursLeft, Self::TotalHoursLeft];

  fn placeholder(self) -> &'static str {
    match self {
      Self::Name => "{Name}",
      Self::DaysLeft => "{DaysLeft}",
      Self::HoursLeft => "{HoursLeft}",
      Self::TotalHoursLeft => "{TotalHoursLeft}",
    }
  }

  /// The token whose placeholder starts `text`, if any.
  fn at(text: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| text.starts_with(t.placeholder()))
  }

  fn write_value(self, target: &NotificationTarget, out: &mut String) {
    match self {
      Self::Name => out.push_str(&target.name),
      Self::DaysLeft => out.push_str(&target.days_left.to_string()),
      Self::HoursLeft => out.push_str(&target.hours_left.to_string()),
      Self::TotalHoursLeft => {
        out.push_str(&target.total_hours_left.to_string())
      }
    }
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Substitute every recognised token in `template` with `target`'s values.
///
/// Single pass: substituted text is never scanned again, so a display name
/// that happens to contain `{DaysLeft}` is emitted literally.
pub fn render(template: &str, target: &NotificationTarget) -> String {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let tail = &rest[open..];
    match Token::at(tail) {
      Some(token) => {
        token.write_value(target, &mut out);
        rest = &tail[token.placeholder().len()..];
      }
      None => {
        out.push('{');
        rest = &tail[1..];
      }
    }
  }

  out.push_str(rest);
  out
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Read the body template in full.
///
/// A byte-order mark selects UTF-8, UTF-16LE or UTF-16BE and is stripped;
/// without one the file is read as UTF-8.
pub fn load_template(path: &Path) -> Result<String> {
  let bytes = std::fs::read(path).map_err(|source| Error::TemplateUnreadable {
    path: path.to_path_buf(),
    source,
  })?;
  decode_template(&bytes)
    .ok_or_else(|| Error::TemplateEncoding { path: path.to_path_buf() })
}

fn decode_template(bytes: &[u8]) -> Option<String> {
  let (encoding, bom_len): (&'static Encoding, usize) =
    Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
  let (text, had_errors) =
    encoding.decode_without_bom_handling(&bytes[bom_len..]);
  (!had_errors).then(|| text.into_owned())
}
