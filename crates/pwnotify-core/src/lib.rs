//! Core types and the notification pipeline for `pwnotify`.
//!
//! This crate holds no directory or SMTP code. Adapters implement the
//! [`directory::Directory`] and [`transport::MailTransport`] traits and the
//! binary wires them into a [`run::RunCoordinator`].

// Native `async fn` in traits; the pipeline runs on a single-threaded runtime
// so the returned futures never need to be `Send`.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod policy;
pub mod run;
pub mod template;
pub mod transport;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
