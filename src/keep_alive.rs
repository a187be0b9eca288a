// src/keep_alive.rs
//! Periodically opening the watched file to keep change notifications flowing.
//!
//! Some platforms only report changes reliably for files that are actively being opened. This
//! loop repeatedly opens a shared read handle, holds it for an interval, and drops it. It has no
//! other effect, and watchers on platforms with reliable notifications don't need it.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::tail;

/// Start the keep-alive loop for `path` on a background thread.
///
/// The thread runs until the process exits.
///
/// # Errors
///
/// Propagates any `io::Error` from spawning the thread.
pub fn spawn(path: PathBuf, interval: Duration) -> io::Result<thread::JoinHandle<()>> {
    debug!(
        "Keeping {} open with interval {:?}",
        path.display(),
        interval
    );

    thread::Builder::new()
        .name("keep-alive".to_string())
        .spawn(move || {
            let mut failing = false;
            loop {
                match hold_open(&path, interval) {
                    Ok(()) => failing = false,
                    Err(error) => {
                        if !failing {
                            warn!("Unable to open {} to keep it alive: {}", path.display(), error);
                        }
                        failing = true;
                        thread::sleep(interval);
                    }
                }
            }
        })
}

/// Open `path` and hold the handle for `interval`.
fn hold_open(path: &Path, interval: Duration) -> io::Result<()> {
    let _file = tail::open_shared(path)?;
    thread::sleep(interval);
    Ok(())
}
