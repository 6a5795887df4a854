//! `pwnotify` binary.
//!
//! Resolves settings from `--config`, `PWNOTIFY_*` environment variables and
//! flags, then emails every member of the configured group whose password
//! expires within the notification window. Meant to run once a day from a
//! scheduler.
//!
//! ```text
//! pwnotify -g Staff --nd 14 --mt template.txt --es mail.corp.example \
//!   --se it@corp.example -d directory.json
//! ```
//!
//! Exit status is `0` when every eligible member was notified (or when the
//! arguments were incomplete and guidance was printed), `1` when the run
//! failed, any delivery failed, or a config source could not be read.

mod cli;
mod settings;

use std::{ffi::OsString, process::ExitCode};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::Parser;
use pwnotify_core::run::{RunCoordinator, RunReport};
use pwnotify_directory::SnapshotDirectory;
use pwnotify_smtp::SmtpTransport;
use tracing::{debug, error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

use crate::{
  cli::Cli,
  settings::{Resolved, Settings},
};

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let cli = match parse_args(std::env::args_os()) {
    Ok(cli) => cli,
    Err(status) => return ExitCode::from(status),
  };

  let default_level = if cli.verbose {
    LevelFilter::DEBUG
  } else {
    LevelFilter::INFO
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  let resolved = match Settings::load(&cli).and_then(Settings::validate) {
    Ok(resolved) => resolved,
    Err(e) => {
      eprintln!("{e}");
      return ExitCode::from(e.exit_status());
    }
  };

  let result = run(&resolved, Utc::now()).await;
  if let Err(e) = &result {
    error!("{e:#}");
  }
  ExitCode::from(run_status(&result))
}

/// Parse the command line. Usage errors, `--help` and `--version` are
/// printed and map to a clean exit; they are not run failures.
fn parse_args<I, T>(args: I) -> Result<Cli, u8>
where
  I: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
{
  Cli::try_parse_from(args).map_err(|e| {
    let _ = e.print();
    EXIT_OK
  })
}

/// `0` only when the run completed and every eligible member was notified.
fn run_status(result: &anyhow::Result<RunReport>) -> u8 {
  match result {
    Ok(report) if report.is_success() => EXIT_OK,
    _ => EXIT_FAILED,
  }
}

async fn run(
  resolved: &Resolved,
  now: DateTime<Utc>,
) -> anyhow::Result<RunReport> {
  log_settings(resolved, now);

  let directory = SnapshotDirectory::new(&resolved.directory);
  let transport = SmtpTransport::new(resolved.smtp.clone());

  let report = RunCoordinator::new(&resolved.run, &directory, &transport)
    .run(now)
    .await
    .with_context(|| format!("run for group {:?} failed", resolved.run.group))?;

  for outcome in report.outcomes.iter().filter(|o| !o.succeeded) {
    error!(
      recipient = %outcome.recipient,
      error = outcome.error_detail.as_deref().unwrap_or("unknown error"),
      "notification not delivered"
    );
  }
  info!(
    scanned = report.members_scanned,
    eligible = report.eligible,
    sent = report.sent(),
    failed = report.failed(),
    aborted = report.aborted,
    "run complete"
  );
  match serde_json::to_string(&report) {
    Ok(json) => debug!(report = %json, "run report"),
    Err(e) => warn!(error = %e, "could not serialise run report"),
  }

  Ok(report)
}

fn log_settings(resolved: &Resolved, now: DateTime<Utc>) {
  let run = &resolved.run;
  info!(version = env!("CARGO_PKG_VERSION"), "pwnotify starting");
  info!(
    group = %run.group,
    notification_days = run.notification_days,
    template = %run.template_path.display(),
    subject = %run.subject,
    sender = %run.sender,
    server = %resolved.smtp.address(),
    directory = %resolved.directory.display(),
    max_password_age = run.max_password_age_override.as_deref().unwrap_or("domain policy"),
    test_email = run.test_recipient.as_deref().unwrap_or("-"),
    on_delivery_failure = ?run.failure_policy,
    run_at = %now.to_rfc3339(),
    "settings"
  );
}
