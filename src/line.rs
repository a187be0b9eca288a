// src/line.rs
//! Extraction of alert messages from timestamp-prefixed log lines.
//!
//! Log lines are expected to look like `[12:00:00] something happened`. Everything up to the
//! first `"] "` is the timestamp, and the field after it is the message.

/// The token separating the timestamp bracket from the message.
const TIMESTAMP_DELIMITER: &str = "] ";

/// A log line with no timestamp delimiter, so no message could be extracted.
#[derive(Debug, Eq, PartialEq)]
pub struct FormatError {
    line: String,
}

impl FormatError {
    /// The offending log line.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "no timestamp found in log line: {}", self.line)
    }
}

impl std::error::Error for FormatError {}

/// Extract the alertable message from a log `line`.
///
/// The line is split on the exact token `"] "` and the second field is returned. If the token
/// occurs more than once, only the text between the first and second occurrence is returned:
///
/// ```
/// use log_alerter::line::extract_message;
///
/// assert_eq!(extract_message("[12:00] hello").unwrap(), "hello");
/// assert_eq!(extract_message("[12:00] [warn] disk full").unwrap(), "[warn");
/// ```
///
/// No case or whitespace normalization is applied.
///
/// # Errors
///
/// Returns a [`FormatError`] if `line` does not contain `"] "`.
pub fn extract_message(line: &str) -> Result<&str, FormatError> {
    line.split(TIMESTAMP_DELIMITER)
        .nth(1)
        .ok_or_else(|| FormatError {
            line: line.to_string(),
        })
}
