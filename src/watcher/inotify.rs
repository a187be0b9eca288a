// src/watcher/inotify.rs
//! [`Watcher`] implementation for linux, based on `inotify`.
//!
//! The watch is placed on the file's parent directory rather than the file itself, and events are
//! filtered by file name. This way creation, deletion, and renames of the file are reported the
//! same way as writes.
use std::ffi::OsStr;
use std::io;

use inotify::{EventMask, Inotify, WatchMask};

use crate::watcher::{self, ChangeEvent, ChangeKind, Notification, WatchError, WatchTarget};

const INOTIFY_BUFFER_SIZE: usize = 4096;

pub(super) struct Watcher {
    inner: Inotify,
    buffer: [u8; INOTIFY_BUFFER_SIZE],
    target: Option<WatchTarget>,
}

impl watcher::Watcher for Watcher {
    fn new() -> io::Result<Self> {
        let inner = Inotify::init()?;
        Ok(Watcher {
            inner,
            buffer: [0; INOTIFY_BUFFER_SIZE],
            target: None,
        })
    }

    /// Watch a file for changes.
    ///
    /// # Callee responsibilities
    ///
    /// It is the caller's responsibility to ensure that:
    ///
    /// - `target` is canonical (symlinks are not dereferenced).
    /// - `watch_file` is called at most once. A second call would add a second directory watch,
    ///   but only events for the latest target would be reported.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to register the watch.
    fn watch_file(&mut self, target: &WatchTarget) -> io::Result<()> {
        self.inner.add_watch(
            target.directory(),
            WatchMask::MODIFY
                | WatchMask::ATTRIB
                | WatchMask::CREATE
                | WatchMask::DELETE
                | WatchMask::MOVED_FROM
                | WatchMask::MOVED_TO
                | WatchMask::ONLYDIR
                | WatchMask::DONT_FOLLOW,
        )?;
        self.target = Some(target.clone());
        Ok(())
    }

    fn read_events_blocking(&mut self) -> io::Result<Vec<Notification>> {
        let inotify_events = self.inner.read_events_blocking(&mut self.buffer)?;

        let target = match &self.target {
            Some(target) => target,
            None => return Ok(Vec::new()),
        };

        Ok(inotify_events
            .filter_map(|event| notification(target, event.mask, event.name))
            .collect())
    }
}

fn notification(
    target: &WatchTarget,
    mask: EventMask,
    name: Option<&OsStr>,
) -> Option<Notification> {
    if mask.contains(EventMask::Q_OVERFLOW) {
        return Some(Notification::Error(WatchError::Overflow));
    }
    if mask.contains(EventMask::IGNORED) {
        return Some(Notification::Error(WatchError::Removed(
            target.directory().to_path_buf(),
        )));
    }
    if name != Some(target.file_name()) {
        return None;
    }

    let kind = if mask.intersects(EventMask::MODIFY | EventMask::ATTRIB) {
        ChangeKind::Modified
    } else if mask.contains(EventMask::CREATE) {
        ChangeKind::Created
    } else if mask.contains(EventMask::DELETE) {
        ChangeKind::Deleted
    } else if mask.intersects(EventMask::MOVED_FROM | EventMask::MOVED_TO) {
        ChangeKind::Renamed
    } else {
        return None;
    };

    Some(Notification::Change(ChangeEvent {
        kind,
        path: target.path(),
    }))
}
