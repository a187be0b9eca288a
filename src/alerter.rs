// src/alerter.rs
//! The orchestrator that turns appended log lines into alerts.
//!
//! An [`Alerter`] watches one file. Whenever its content changes, the file's last line is read
//! and compared with the last line seen. A new line has its timestamp stripped (see
//! [`line::extract_message`](crate::line::extract_message)) and the message is sent to the
//! configured [`AlertService`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::alert::{AlertService, DeliveryError};
use crate::error::Chain;
use crate::keep_alive;
use crate::line;
use crate::tail;
use crate::watcher::{self, ChangeEvent, ChangeHandler, ChangeWatcher, WatchError, WatchTarget};

/// Possible error situations when constructing an [`Alerter`].
#[derive(Debug)]
pub enum AlerterError {
    /// The log file to watch doesn't exist.
    FileNotFound {
        /// The configured path.
        path: PathBuf,

        /// The error from resolving the path.
        source: io::Error,
    },

    /// The log file path can't be watched (e.g. it has no parent directory).
    InvalidPath(io::Error),
}

impl fmt::Display for AlerterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlerterError::FileNotFound { path, .. } => {
                write!(f, "No file at {} exists!", path.display())
            }
            AlerterError::InvalidPath(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for AlerterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlerterError::FileNotFound { source, .. } => Some(source),
            AlerterError::InvalidPath(_) => None,
        }
    }
}

/// What happened when handling a change to the watched file.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    /// A new line was found and its message was sent.
    Alerted(String),

    /// The last line is the same as the last line seen, so nothing was sent.
    Unchanged,

    /// The file is empty.
    Empty,

    /// A new line was found, but it has no timestamp so nothing was sent.
    Malformed,

    /// The file couldn't be read, so the last line seen was kept.
    Unreadable,
}

/// State mutated by change events.
#[derive(Debug, Default)]
struct AlerterState {
    last_read_line: Option<String>,
}

/// Watches a log file and sends an alert for each new last line.
pub struct Alerter<S> {
    target: WatchTarget,
    service: S,
    state: Mutex<AlerterState>,
}

impl<S: AlertService> Alerter<S> {
    /// Construct an `Alerter` for the file at `log_file`, delivering alerts through `service`.
    ///
    /// `log_file` is canonicalized once, here. If it is a symlink, the file it points to now is
    /// the one that gets watched, and re-pointing the link later (e.g. symlink-based log rotation)
    /// is not followed.
    ///
    /// # Errors
    ///
    /// - [`AlerterError::FileNotFound`] if `log_file` doesn't exist.
    /// - [`AlerterError::InvalidPath`] if `log_file` can't be split into directory and file name.
    pub fn new(log_file: &Path, service: S) -> Result<Self, AlerterError> {
        let target = Self::validate(log_file).map_err(|error| {
            error!("{}", Chain(&error));
            error
        })?;

        Ok(Self {
            target,
            service,
            state: Mutex::default(),
        })
    }

    fn validate(log_file: &Path) -> Result<WatchTarget, AlerterError> {
        let not_found = |source| AlerterError::FileNotFound {
            path: log_file.to_path_buf(),
            source,
        };

        let path = log_file.canonicalize().map_err(not_found)?;
        if !path.is_file() {
            return Err(not_found(io::Error::new(
                io::ErrorKind::Other,
                "not a regular file",
            )));
        }

        WatchTarget::new(&path).map_err(AlerterError::InvalidPath)
    }

    /// The canonical path of the watched file.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.target.path()
    }

    /// Watch the file and send alerts forever.
    ///
    /// If `keep_alive` is set, a [`keep_alive`] loop is started with that interval first.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from starting the keep-alive thread or registering the watch.
    /// Once watching has started this never returns.
    pub fn run(self, keep_alive: Option<Duration>) -> io::Result<()> {
        if let Some(interval) = keep_alive {
            keep_alive::spawn(self.target.path(), interval)?;
        }

        let change_watcher = ChangeWatcher::new(watcher::watcher()?, &self.target)?;
        info!("Watching {}", self.target.path().display());
        change_watcher.run(&self)
    }

    /// Check the file at `path` for a new last line, and send an alert if there is one.
    ///
    /// The line is remembered as seen whatever happens to the alert, so a line that failed to be
    /// delivered is not retried on the next change.
    ///
    /// # Errors
    ///
    /// Propagates any [`DeliveryError`] from the alert service.
    pub fn handle_change(&self, path: &Path) -> Result<Outcome, DeliveryError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let last_line = match tail::read_last_line(path) {
            Ok(last_line) => last_line,
            Err(error) => {
                warn!("Unable to read {}: {}", path.display(), error);
                return Ok(Outcome::Unreadable);
            }
        };

        let last_line = match last_line {
            Some(last_line) => last_line,
            None => {
                state.last_read_line = None;
                return Ok(Outcome::Empty);
            }
        };

        if state.last_read_line.as_ref() == Some(&last_line) {
            return Ok(Outcome::Unchanged);
        }

        let result = match line::extract_message(&last_line) {
            Ok(message) => self
                .service
                .send(message)
                .map(|()| Outcome::Alerted(message.to_string())),
            Err(_) => {
                warn!(
                    "No timestamp was found. Not a valid log message. An alert will not be sent for message: {}",
                    last_line
                );
                Ok(Outcome::Malformed)
            }
        };

        state.last_read_line = Some(last_line);
        result
    }
}

impl<S: AlertService> ChangeHandler for Alerter<S> {
    fn on_changed(&self, event: &ChangeEvent) {
        match self.handle_change(&event.path) {
            Ok(outcome) => debug!("Handled change to {}: {:?}", event.path.display(), outcome),
            Err(error) => error!("{}", Chain(&error)),
        }
    }

    fn on_error(&self, error: &WatchError) {
        error!("{}", Chain(error));
    }
}
