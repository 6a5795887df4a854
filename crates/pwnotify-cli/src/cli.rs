//! Command-line flags.
//!
//! Every setting can also come from the config file or a `PWNOTIFY_*`
//! environment variable; flags win. The short aliases (`--nd`, `--mt`, …)
//! are kept for existing scheduled-task definitions.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
  name = "pwnotify",
  version,
  about = "Email members of a directory group whose password is about to expire"
)]
pub struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Group whose members are checked (name, account name, UPN, DN, SID or
  /// GUID).
  #[arg(short, long)]
  pub group: Option<String>,

  /// Notify members whose password expires in fewer than this many days.
  #[arg(long, visible_alias = "nd", value_name = "DAYS")]
  pub notification_days: Option<String>,

  /// Text file used as the email body.
  #[arg(long, visible_alias = "mt", value_name = "FILE")]
  pub message_template: Option<PathBuf>,

  /// Email server host name or IP address.
  #[arg(long, visible_alias = "es", value_name = "HOST")]
  pub email_server: Option<String>,

  #[arg(long, value_name = "PORT")]
  pub smtp_port: Option<u16>,

  /// From address for the notifications.
  #[arg(long, visible_alias = "se", value_name = "ADDRESS")]
  pub sender_email: Option<String>,

  /// Subject line; accepts the same tokens as the template.
  #[arg(short, long)]
  pub subject: Option<String>,

  /// Maximum password age in days; defaults to the domain policy.
  #[arg(long, visible_alias = "mpa", value_name = "DAYS")]
  pub max_password_age: Option<String>,

  /// Send every notification to this address instead of the members.
  #[arg(long, visible_alias = "te", value_name = "ADDRESS")]
  pub test_email: Option<String>,

  /// JSON export of the directory.
  #[arg(short, long, value_name = "FILE")]
  pub directory: Option<PathBuf>,

  /// Username for SMTP `AUTH PLAIN`; the password is read from
  /// `PWNOTIFY_SMTP_PASSWORD` or the config file.
  #[arg(long, value_name = "USER")]
  pub smtp_username: Option<String>,

  /// Name announced in EHLO.
  #[arg(long, value_name = "NAME")]
  pub helo_name: Option<String>,

  /// Stop at the first failed delivery instead of notifying the rest.
  #[arg(long)]
  pub abort_on_failure: bool,

  /// Log at debug level, including the SMTP conversation.
  #[arg(short, long)]
  pub verbose: bool,
}
