// src/watcher/mock.rs
//! Mock [`Watcher`](crate::watcher::Watcher) implementation.
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::rc::Rc;

use crate::watcher::{self, ChangeEvent, ChangeKind, Notification, WatchError, WatchTarget};

/// A mock [`Watcher`](crate::watcher::Watcher) implementation.
///
/// This watches no actual files, but rather asserts invariants and lets tests decide exactly which
/// notifications are delivered, and when.
pub(crate) struct Watcher {
    mock: Rc<RefCell<Mock>>,
}

/// The inner-type of [`Watcher`] that maintains the watched target and pushed notifications.
struct Mock {
    target: Option<WatchTarget>,
    pending: Vec<Notification>,
}

impl Watcher {
    /// Create a new instance.
    pub(crate) fn new() -> Self {
        Self {
            mock: Rc::new(RefCell::new(Mock {
                target: None,
                pending: Vec::new(),
            })),
        }
    }

    /// Simulate a write to the watched file.
    ///
    /// The given `text` is appended to the watched file, and a [`ChangeKind::Modified`] event is
    /// pushed for later collection by [`read_events_blocking`](watcher::Watcher::read_events_blocking).
    ///
    /// # Panics
    ///
    /// This will panic if no file has been watched.
    pub(crate) fn simulate_write(&mut self, text: &str) -> io::Result<()> {
        use std::io::Write;

        let path = self.target().path();
        write!(OpenOptions::new().append(true).open(&path)?, "{}", text)?;
        self.simulate_change(ChangeKind::Modified);

        Ok(())
    }

    /// Simulate a metadata-only change (e.g. `touch`) to the watched file.
    ///
    /// # Panics
    ///
    /// This will panic if no file has been watched.
    pub(crate) fn simulate_touch(&mut self) {
        self.simulate_change(ChangeKind::Modified);
    }

    /// Push an event of the given `kind` for the watched file, without touching the file.
    ///
    /// # Panics
    ///
    /// This will panic if no file has been watched.
    pub(crate) fn simulate_change(&mut self, kind: ChangeKind) {
        let path = self.target().path();
        self.mock
            .borrow_mut()
            .pending
            .push(Notification::Change(ChangeEvent { kind, path }));
    }

    /// Push a watcher failure.
    pub(crate) fn simulate_error(&mut self, error: WatchError) {
        self.mock
            .borrow_mut()
            .pending
            .push(Notification::Error(error));
    }

    fn target(&self) -> WatchTarget {
        self.mock
            .borrow()
            .target
            .clone()
            .expect("can't simulate events before watch_file")
    }
}

impl Clone for Watcher {
    fn clone(&self) -> Self {
        Self {
            mock: Rc::clone(&self.mock),
        }
    }
}

impl watcher::Watcher for Watcher {
    fn new() -> io::Result<Self> {
        Ok(Self::new())
    }

    /// Watch a file for changes.
    ///
    /// This records `target` so that simulated events can refer to it.
    ///
    /// Additionally, assertions are in place to validate the callee responsibilities of the trait
    /// method:
    ///
    /// - `target` points to a file.
    /// - `target` is canonical.
    /// - `watch_file` has not been called before.
    fn watch_file(&mut self, target: &WatchTarget) -> io::Result<()> {
        let path = target.path();
        let canonical_path = path.canonicalize()?;

        assert!(path.is_file(), "called watch_file with non-file {:?}", path);
        assert_eq!(
            path, canonical_path,
            "called watch_file with link {:?} to {:?}",
            path, canonical_path
        );

        let mut mock = self.mock.borrow_mut();
        assert!(
            mock.target.is_none(),
            "called watch_file more than once with {:?}",
            path
        );
        mock.target = Some(target.clone());

        Ok(())
    }

    /// Pop whatever [`Notification`]s have been pushed through the `simulate_*` methods.
    ///
    /// # Panics
    ///
    /// This panics if there are no notifications, since blocking in a test is more likely to be a
    /// bug with usage of the mock.
    fn read_events_blocking(&mut self) -> io::Result<Vec<Notification>> {
        let pending = std::mem::take(&mut self.mock.borrow_mut().pending);
        assert!(
            !pending.is_empty(),
            "called read_events_blocking with no events prepared"
        );
        Ok(pending)
    }
}
