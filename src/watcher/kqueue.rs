// src/watcher/kqueue.rs
//! [`Watcher`] implementation for `MacOS`, based on `kqueue`.
use std::io;

use kqueue::{self, EventData, EventFilter, FilterFlag, Vnode};

use crate::watcher::{self, ChangeEvent, ChangeKind, Notification, WatchError, WatchTarget};

pub(super) struct Watcher {
    inner: kqueue::Watcher,
    target: Option<WatchTarget>,
}

impl watcher::Watcher for Watcher {
    fn new() -> io::Result<Self> {
        let inner = kqueue::Watcher::new()?;
        Ok(Watcher {
            inner,
            target: None,
        })
    }

    /// Watch a file for changes.
    ///
    /// `kqueue` watches the open file rather than the path, so the events we can register for
    /// are `EVFILT_VNODE` filters on the file's descriptor. Writes, extensions, and attribute
    /// changes are reported as modifications. Once the file is deleted or renamed, the watch keeps
    /// following the original inode.
    ///
    /// # Callee responsibilities
    ///
    /// It is the caller's responsibility to ensure that:
    ///
    /// - `target` is canonical.
    /// - `watch_file` is called at most once. `kqueue` will happily register duplicate watches for
    ///   the same path, and emit duplicate events.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` caused when attempting to register the watch.
    fn watch_file(&mut self, target: &WatchTarget) -> io::Result<()> {
        self.inner.add_filename(
            target.path(),
            EventFilter::EVFILT_VNODE,
            FilterFlag::NOTE_WRITE
                | FilterFlag::NOTE_EXTEND
                | FilterFlag::NOTE_ATTRIB
                | FilterFlag::NOTE_DELETE
                | FilterFlag::NOTE_RENAME,
        )?;
        self.inner.watch()?;
        self.target = Some(target.clone());
        Ok(())
    }

    fn read_events_blocking(&mut self) -> io::Result<Vec<Notification>> {
        let kq_event = self.inner.iter().next();

        let target = match &self.target {
            Some(target) => target,
            None => return Ok(Vec::new()),
        };

        Ok(kq_event
            .and_then(|kq_event| notification(target, kq_event.data))
            .into_iter()
            .collect())
    }
}

fn notification(target: &WatchTarget, data: EventData) -> Option<Notification> {
    let kind = match data {
        EventData::Vnode(Vnode::Write)
        | EventData::Vnode(Vnode::Extend)
        | EventData::Vnode(Vnode::Attrib) => ChangeKind::Modified,
        EventData::Vnode(Vnode::Delete) => ChangeKind::Deleted,
        EventData::Vnode(Vnode::Rename) => ChangeKind::Renamed,
        EventData::Error(error) => return Some(Notification::Error(WatchError::Platform(error))),
        _ => return None,
    };

    Some(Notification::Change(ChangeEvent {
        kind,
        path: target.path(),
    }))
}
