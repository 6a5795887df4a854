//! Layered settings: config file, then `PWNOTIFY_*` environment, then flags.

use std::{path::PathBuf, time::Duration};

use config::{Config, Environment, File};
use pwnotify_core::config::{DEFAULT_SUBJECT, FailurePolicy, RunConfig};
use pwnotify_smtp::{Credentials, SmtpConfig, config::DEFAULT_PORT};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

const ENV_PREFIX: &str = "PWNOTIFY";

// ─── Guidance ─────────────────────────────────────────────────────────────────

const GROUP_HELP: &str = "\
Please specify which security group contains the users who should be notified
when their account password is about to expire.

The group can be identified by any of:
 - Name
 - SAM account name
 - User principal name (UPN)
 - Distinguished name (DN)
 - Security identifier (SID), e.g. S-1-5-21-...
 - Globally unique identifier (GUID)";

const NOTIFICATION_DAYS_HELP: &str =
  "Please specify the number of days before expiration to start notifying users.";

const TEMPLATE_HELP: &str = "Please specify the path to the email template \
                             text file used when sending out notifications.";

const SERVER_HELP: &str =
  "Please specify the email server, either as an IP address or a host name.";

const SENDER_HELP: &str =
  "Please specify the from address to use for the email notifications.";

const DIRECTORY_HELP: &str =
  "Please specify the path to the JSON export of the directory.";

const TIMEOUT_HELP: &str =
  "The SMTP timeout must be at least one second.";

const CREDENTIALS_HELP: &str = "An SMTP username was given without a \
                                password; set PWNOTIFY_SMTP_PASSWORD or \
                                smtp_password in the config file.";

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("failed to load configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("Missing or invalid argument: {flag}\n\n{guidance}")]
  Invalid {
    flag:     &'static str,
    guidance: &'static str,
  },
}

impl SettingsError {
  /// Process exit status: guidance for a missing or invalid value exits
  /// cleanly, a configuration source that cannot be read does not.
  pub fn exit_status(&self) -> u8 {
    match self {
      Self::Invalid { .. } => 0,
      Self::Load(_) => 1,
    }
  }
}

fn invalid(flag: &'static str, guidance: &'static str) -> SettingsError {
  SettingsError::Invalid { flag, guidance }
}

// ─── Raw settings ─────────────────────────────────────────────────────────────

/// Merged settings before validation. Every field is optional here so that a
/// missing value can be reported with guidance instead of a serde error.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
  pub group:               Option<String>,
  pub notification_days:   Option<String>,
  pub message_template:    Option<PathBuf>,
  pub email_server:        Option<String>,
  pub smtp_port:           Option<u16>,
  pub sender_email:        Option<String>,
  pub subject:             Option<String>,
  pub max_password_age:    Option<String>,
  pub test_email:          Option<String>,
  pub directory:           Option<PathBuf>,
  pub smtp_username:       Option<String>,
  pub smtp_password:       Option<String>,
  pub helo_name:           Option<String>,
  pub smtp_timeout_secs:   Option<u64>,
  pub on_delivery_failure: Option<FailurePolicy>,
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct Resolved {
  pub run:       RunConfig,
  pub smtp:      SmtpConfig,
  pub directory: PathBuf,
}

impl Settings {
  /// Merge the config file (if any), the process environment and `cli`.
  pub fn load(cli: &Cli) -> Result<Self, SettingsError> {
    Self::load_with_env(cli, Environment::with_prefix(ENV_PREFIX))
  }

  fn load_with_env(
    cli: &Cli,
    environment: Environment,
  ) -> Result<Self, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = &cli.config {
      builder = builder.add_source(File::from(path.clone()).required(true));
    }

    let path_string =
      |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

    let settings = builder
      .add_source(environment)
      .set_override_option("group", cli.group.clone())?
      .set_override_option("notification_days", cli.notification_days.clone())?
      .set_override_option("message_template", path_string(&cli.message_template))?
      .set_override_option("email_server", cli.email_server.clone())?
      .set_override_option("smtp_port", cli.smtp_port.map(i64::from))?
      .set_override_option("sender_email", cli.sender_email.clone())?
      .set_override_option("subject", cli.subject.clone())?
      .set_override_option("max_password_age", cli.max_password_age.clone())?
      .set_override_option("test_email", cli.test_email.clone())?
      .set_override_option("directory", path_string(&cli.directory))?
      .set_override_option("smtp_username", cli.smtp_username.clone())?
      .set_override_option("helo_name", cli.helo_name.clone())?
      .set_override_option(
        "on_delivery_failure",
        cli.abort_on_failure.then_some("abort"),
      )?
      .build()?;

    Ok(settings.try_deserialize()?)
  }

  /// Check required values and build the run and transport configuration.
  pub fn validate(self) -> Result<Resolved, SettingsError> {
    let group =
      non_empty(self.group).ok_or(invalid("--group (-g)", GROUP_HELP))?;

    let notification_days = non_empty(self.notification_days)
      .and_then(|days| days.trim().parse::<u32>().ok())
      .ok_or(invalid("--notification-days (--nd)", NOTIFICATION_DAYS_HELP))?;

    let template_path = self
      .message_template
      .filter(|path| path.is_file())
      .ok_or(invalid("--message-template (--mt)", TEMPLATE_HELP))?;

    let host = non_empty(self.email_server)
      .ok_or(invalid("--email-server (--es)", SERVER_HELP))?;

    let sender = non_empty(self.sender_email)
      .ok_or(invalid("--sender-email (--se)", SENDER_HELP))?;

    let directory = self
      .directory
      .filter(|path| !path.as_os_str().is_empty())
      .ok_or(invalid("--directory (-d)", DIRECTORY_HELP))?;

    let credentials = match (non_empty(self.smtp_username), self.smtp_password) {
      (Some(username), Some(password)) => Some(Credentials { username, password }),
      (Some(_), None) => {
        return Err(invalid("--smtp-username", CREDENTIALS_HELP));
      }
      (None, _) => None,
    };

    let mut smtp = SmtpConfig::new(host);
    smtp.port = self.smtp_port.unwrap_or(DEFAULT_PORT);
    smtp.credentials = credentials;
    if let Some(name) = non_empty(self.helo_name) {
      smtp.helo_name = name;
    }
    match self.smtp_timeout_secs {
      Some(0) => return Err(invalid("smtp_timeout_secs", TIMEOUT_HELP)),
      Some(secs) => smtp.timeout = Duration::from_secs(secs),
      None => {}
    }

    let mut run = RunConfig::new(group, notification_days, template_path, sender);
    run.subject = self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    run.max_password_age_override = non_empty(self.max_password_age);
    run.test_recipient = non_empty(self.test_email);
    run.failure_policy = self.on_delivery_failure.unwrap_or_default();

    Ok(Resolved { run, smtp, directory })
  }
}

/// `None` for absent or blank values.
fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
