// src/watcher/mod.rs
//! Platform-agnostic watching of a single file.
//!
//! The [`Watcher`] trait defines a platform-agnostic interface for receiving change notifications
//! about one file, and the [`watcher`] function returns an implementation of `Watcher` for the
//! target platform. [`ChangeWatcher`] drives a `Watcher` and forwards content changes and watcher
//! failures to a [`ChangeHandler`].
//!
//! The [`imp`] module contains the `Watcher` implementation for the target platform.

#[cfg(target_os = "linux")]
mod inotify;
#[cfg(target_os = "macos")]
mod kqueue;
#[cfg(test)]
pub(crate) mod mock;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, trace};

#[cfg(target_os = "linux")]
use self::inotify as imp;

#[cfg(target_os = "macos")]
use self::kqueue as imp;

/// How long to back off after failing to read events, so a persistent failure doesn't spin.
const READ_ERROR_PAUSE: Duration = Duration::from_millis(500);

pub(crate) fn watcher() -> io::Result<impl Watcher> {
    imp::Watcher::new()
}

/// The file being watched, split into its directory and file name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WatchTarget {
    directory: PathBuf,
    file_name: OsString,
}

impl WatchTarget {
    /// Split `path` into a watch target.
    ///
    /// `path` should be canonical, since neither the directory nor the file name are resolved any
    /// further.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` of kind `InvalidInput` if `path` has no file name or no parent.
    pub fn new(path: &Path) -> io::Result<Self> {
        let invalid = || {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot watch {}: not a file path", path.display()),
            )
        };

        let file_name = path.file_name().ok_or_else(invalid)?;
        let directory = path.parent().ok_or_else(invalid)?;

        Ok(Self {
            directory: directory.to_path_buf(),
            file_name: file_name.to_os_string(),
        })
    }

    /// The directory containing the watched file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The name of the watched file within [`directory`](Self::directory).
    #[must_use]
    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }

    /// The full path of the watched file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// The kind of change reported for the watched file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeKind {
    /// The file's contents, size, attributes, or other metadata changed.
    Modified,

    /// The file was created.
    Created,

    /// The file was deleted.
    Deleted,

    /// The file was renamed, or another file was renamed to it.
    Renamed,
}

/// A change to the watched file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    /// What happened to the file.
    pub kind: ChangeKind,

    /// The full path of the file.
    pub path: PathBuf,
}

/// A failure of the underlying watch mechanism.
#[derive(Debug)]
pub enum WatchError {
    /// Reading events from the operating system failed.
    Read(io::Error),

    /// The operating system's event queue overflowed, so some changes were not reported.
    Overflow,

    /// The operating system removed the watch, e.g. because the watched directory was deleted.
    Removed(PathBuf),

    /// The operating system reported an error for the watch.
    Platform(io::Error),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WatchError::Read(_) => write!(f, "failed to read file watcher events"),
            WatchError::Overflow => write!(
                f,
                "file watcher event queue overflowed, some changes may have been missed"
            ),
            WatchError::Removed(path) => write!(f, "watch on {} was removed", path.display()),
            WatchError::Platform(_) => write!(f, "file watcher reported an error"),
        }
    }
}

impl std::error::Error for WatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchError::Read(error) | WatchError::Platform(error) => Some(error),
            WatchError::Overflow | WatchError::Removed(_) => None,
        }
    }
}

/// Something a platform [`Watcher`] reports about the watched file.
#[derive(Debug)]
pub(crate) enum Notification {
    Change(ChangeEvent),
    Error(WatchError),
}

/// Callbacks invoked by a [`ChangeWatcher`].
pub trait ChangeHandler {
    /// Called for every [`ChangeKind::Modified`] event on the watched file.
    ///
    /// A single append may cause several calls.
    fn on_changed(&self, event: &ChangeEvent);

    /// Called when the watch mechanism itself fails. The watch carries on afterwards.
    fn on_error(&self, error: &WatchError);
}

/// A platform-agnostic single-file watching API.
///
/// The API is necessarily very 'lowest common denominator', and leaves a lot of behaviour
/// implementation-defined. See the notes on callee responsibilities in [`Self::watch_file`].
pub(crate) trait Watcher {
    /// Construct a new instance of the `Watcher`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to create the watcher.
    fn new() -> io::Result<Self>
    where
        Self: Sized;

    /// Watch a file for changes.
    ///
    /// Calling this function should cause the target `Watcher` to emit [`Notification`]s
    /// whenever the file described by `target` is written to, has its attributes changed, or is
    /// created, deleted, or renamed.
    ///
    /// # Callee responsibilities
    ///
    /// It is the caller's responsibility to ensure that:
    ///
    /// - `target` points to an existing file.
    /// - `target` is canonical (e.g. implementations may not resolve symlinks, and may watch the
    ///   symlink itself).
    /// - `watch_file` is called at most once.
    ///
    /// The behaviour if any of these points are violated is implementation defined, and so specific
    /// behaviour should not be relied upon.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to register the watch.
    fn watch_file(&mut self, target: &WatchTarget) -> io::Result<()>;

    /// Read some notifications about the watched file.
    ///
    /// This may block forever if no file has been watched, or if nothing happens to it. It may
    /// also return an empty `Vec` if only unrelated events were received.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to read events.
    fn read_events_blocking(&mut self) -> io::Result<Vec<Notification>>;
}

/// Delivers content changes of one file to a [`ChangeHandler`].
///
/// Only [`ChangeKind::Modified`] events reach [`ChangeHandler::on_changed`]. Creation, deletion,
/// and rename events are dropped.
pub(crate) struct ChangeWatcher<W: Watcher> {
    watcher: W,
}

impl<W: Watcher> ChangeWatcher<W> {
    /// Register a watch for `target` with the given platform `watcher`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to register the watch.
    pub(crate) fn new(mut watcher: W, target: &WatchTarget) -> io::Result<Self> {
        debug!("Initialising watch on {}", target.path().display());
        watcher.watch_file(target)?;
        Ok(Self { watcher })
    }

    /// Wait for the next batch of notifications and dispatch them to `handler`.
    pub(crate) fn poll<H: ChangeHandler + ?Sized>(&mut self, handler: &H) {
        let notifications = match self.watcher.read_events_blocking() {
            Ok(notifications) => notifications,
            Err(error) => {
                handler.on_error(&WatchError::Read(error));
                thread::sleep(READ_ERROR_PAUSE);
                return;
            }
        };

        for notification in notifications {
            trace!("Received watcher notification: {:?}", notification);

            match notification {
                Notification::Change(event) if event.kind == ChangeKind::Modified => {
                    handler.on_changed(&event);
                }
                Notification::Change(event) => {
                    debug!("Ignoring {:?} event for {}", event.kind, event.path.display());
                }
                Notification::Error(error) => handler.on_error(&error),
            }
        }
    }

    /// Dispatch notifications to `handler` forever.
    pub(crate) fn run<H: ChangeHandler + ?Sized>(mut self, handler: &H) -> ! {
        loop {
            self.poll(handler);
        }
    }
}
