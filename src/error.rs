// src/error.rs
//! Rendering of errors together with their causes.

use std::error::Error;
use std::fmt;

/// Display an error followed by every error in its [`source`](Error::source) chain.
///
/// Each cause is written on its own line, prefixed with `caused by:`:
///
/// ```text
/// failed to read watcher events
///   caused by: Bad file descriptor (os error 9)
/// ```
pub struct Chain<'a>(pub &'a (dyn Error + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)?;

        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, "\n  caused by: {}", cause)?;
            source = cause.source();
        }

        Ok(())
    }
}
