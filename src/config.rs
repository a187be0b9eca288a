// src/config.rs
//! Configuration for the `log-alerter` binary.
//!
//! Settings come from command-line flags (each with an environment variable fallback) and,
//! optionally, a JSON settings file:
//!
//! ```json
//! {
//!   "LogFile": "/var/log/game/console.log",
//!   "AlertMethod": "Discord",
//!   "DiscordWebhookUri": "https://discord.com/api/webhooks/..."
//! }
//! ```
//!
//! Flags take precedence over the settings file.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use structopt::StructOpt;

use crate::alert::Method;

/// Command-line arguments.
#[derive(Debug, Default, StructOpt)]
#[structopt(
    about = "Watch a log file and send an alert for each new line.",
    global_settings = &[clap::AppSettings::ColoredHelp]
)]
pub struct Args {
    /// Path to a JSON settings file.
    #[structopt(long, env = "ALERTER_CONFIG", parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// The log file to watch.
    #[structopt(long, env = "ALERTER_LOG_FILE", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    /// Where to send alerts: `Discord` or `Pushover`.
    #[structopt(long, env = "ALERTER_ALERT_METHOD")]
    pub alert_method: Option<String>,

    /// The Discord webhook to post to.
    #[structopt(long, env = "ALERTER_DISCORD_WEBHOOK_URI", hide_env_values = true)]
    pub discord_webhook_uri: Option<String>,

    /// The Pushover user key to notify.
    #[structopt(long, env = "ALERTER_PUSHOVER_USER")]
    pub pushover_user: Option<String>,

    /// The Pushover application token.
    #[structopt(long, env = "ALERTER_PUSHOVER_TOKEN", hide_env_values = true)]
    pub pushover_token: Option<String>,

    /// How long (in milliseconds) the keep-alive loop holds the log file open. 0 disables it.
    #[structopt(long, env = "ALERTER_KEEP_ALIVE_MS", default_value = "500")]
    pub keep_alive_ms: u64,
}

/// The contents of a JSON settings file.
#[derive(Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Settings {
    /// The log file to watch.
    pub log_file: Option<PathBuf>,

    /// Where to send alerts.
    pub alert_method: Option<String>,

    /// The Discord webhook to post to.
    pub discord_webhook_uri: Option<String>,

    /// The Pushover user key to notify.
    pub pushover_user: Option<String>,

    /// The Pushover application token.
    pub pushover_token: Option<String>,
}

impl Settings {
    /// Read settings from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Read`] if the file can't be read.
    /// - [`ConfigError::Parse`] if the file isn't a valid settings object.
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        serde_json::from_slice(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Overlay any settings given in `args` on top of these.
    #[must_use]
    pub fn merge(self, args: Args) -> Self {
        Self {
            log_file: args.log_file.or(self.log_file),
            alert_method: args.alert_method.or(self.alert_method),
            discord_webhook_uri: args.discord_webhook_uri.or(self.discord_webhook_uri),
            pushover_user: args.pushover_user.or(self.pushover_user),
            pushover_token: args.pushover_token.or(self.pushover_token),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct Config {
    /// The log file to watch.
    pub log_file: PathBuf,

    /// The alert channel to deliver to.
    pub method: Method,

    /// The keep-alive interval, if the keep-alive loop should run.
    pub keep_alive: Option<Duration>,
}

impl Config {
    /// Load and validate configuration from `args`, and the settings file it names (if any).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn load(mut args: Args) -> Result<Self, ConfigError> {
        let keep_alive = match args.keep_alive_ms {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        };

        let settings = match args.config.take() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Self::resolve(settings.merge(args), keep_alive)
    }

    /// Validate `settings`.
    ///
    /// Settings are checked in order: `LogFile`, `AlertMethod`, then the credentials of the chosen
    /// method.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn resolve(settings: Settings, keep_alive: Option<Duration>) -> Result<Self, ConfigError> {
        let log_file = required(settings.log_file, "LogFile")?;
        let method_name = required(settings.alert_method, "AlertMethod")?;

        let method = match method_name.as_str() {
            "Discord" => {
                let webhook_uri = required(settings.discord_webhook_uri, "DiscordWebhookUri")?;
                if let Err(error) = reqwest::Url::parse(&webhook_uri) {
                    return Err(ConfigError::Invalid {
                        key: "DiscordWebhookUri",
                        reason: error.to_string(),
                    });
                }
                Method::Discord { webhook_uri }
            }
            "Pushover" => Method::Pushover {
                user: required(settings.pushover_user, "PushoverUser")?,
                token: required(settings.pushover_token, "PushoverToken")?,
            },
            _ => return Err(ConfigError::InvalidAlertMethod(method_name)),
        };

        Ok(Self {
            log_file,
            method,
            keep_alive,
        })
    }
}

fn required<T>(value: Option<T>, key: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::Missing(key))
}

/// Possible error situations when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required setting was not given.
    Missing(&'static str),

    /// `AlertMethod` is not one of the supported methods.
    InvalidAlertMethod(String),

    /// A setting has an unusable value.
    Invalid {
        /// The setting's name.
        key: &'static str,

        /// Why the value can't be used.
        reason: String,
    },

    /// The settings file couldn't be read.
    Read {
        /// The settings file path.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },

    /// The settings file isn't valid.
    Parse {
        /// The settings file path.
        path: PathBuf,

        /// The underlying error.
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => {
                write!(f, "Ensure that {} is defined in the configuration!", key)
            }
            ConfigError::InvalidAlertMethod(method) => write!(
                f,
                "Ensure that AlertMethod is correctly defined in the configuration! \
                 Expected `Discord` or `Pushover`, got `{}`",
                method
            ),
            ConfigError::Invalid { key, reason } => {
                write!(f, "Ensure that {} is valid: {}", key, reason)
            }
            ConfigError::Read { path, .. } => {
                write!(f, "Unable to read settings file {}", path.display())
            }
            ConfigError::Parse { path, .. } => {
                write!(f, "Invalid settings file {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Missing(_)
            | ConfigError::InvalidAlertMethod(_)
            | ConfigError::Invalid { .. } => None,
        }
    }
}
