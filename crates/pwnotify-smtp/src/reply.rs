//! SMTP server replies (RFC 5321 §4.2).

use crate::error::{Error, Result};

/// A complete, possibly multi-line, server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
  pub code:  u16,
  /// Text of each line with the code and separator removed.
  pub lines: Vec<String>,
}

/// One parsed reply line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine<'a> {
  pub code: u16,
  /// `false` for `250-` continuation lines.
  pub last: bool,
  pub text: &'a str,
}

impl Reply {
  /// All lines joined with a space.
  pub fn message(&self) -> String { self.lines.join(" ") }

  /// Whether an EHLO reply advertises `keyword` (case-insensitive).
  pub fn has_extension(&self, keyword: &str) -> bool {
    self.lines.iter().skip(1).any(|line| {
      line
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case(keyword))
    })
  }

  /// `Ok` if the code is one of `expected`, otherwise a
  /// [`Error::Rejected`] naming `stage`.
  pub(crate) fn expect(self, stage: &'static str, expected: &[u16]) -> Result<Self> {
    if expected.contains(&self.code) {
      Ok(self)
    } else {
      Err(Error::Rejected { stage, code: self.code, message: self.message() })
    }
  }
}

/// Parse a single line such as `250-SIZE 1000` or `354 Go ahead`.
pub(crate) fn parse_line(line: &str) -> Result<ReplyLine<'_>> {
  let line = line.trim_end_matches(['\r', '\n']);
  let malformed = || Error::Malformed(line.to_string());

  let digits = line.get(..3).ok_or_else(malformed)?;
  if !digits.bytes().all(|b| b.is_ascii_digit()) {
    return Err(malformed());
  }
  let code: u16 = digits.parse().map_err(|_| malformed())?;

  match line.as_bytes().get(3) {
    None => Ok(ReplyLine { code, last: true, text: "" }),
    Some(b' ') => Ok(ReplyLine { code, last: true, text: &line[4..] }),
    Some(b'-') => Ok(ReplyLine { code, last: false, text: &line[4..] }),
    Some(_) => Err(malformed()),
  }
}
