//! Minimal SMTP submission client for `pwnotify`.
//!
//! One connection per message: greet, optionally authenticate, submit, quit.
//! Plain TCP only; point it at a relay on the local network.

mod client;
mod message;
mod reply;
mod transport;

pub mod config;
pub mod error;

pub use config::{Credentials, SmtpConfig};
pub use error::{Error, Result};
pub use message::format_message;
pub use reply::Reply;
pub use transport::SmtpTransport;
