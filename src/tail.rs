// src/tail.rs
//! Reading the last line of a file that another process may still be appending to.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Open `path` for reading without locking out other readers or writers.
///
/// On Unix a read-only open never takes a lock. On Windows the share mode is set explicitly so
/// that the writing process can keep appending (and even rename or delete the file) while the
/// handle is open.
///
/// # Errors
///
/// Propagates any `io::Error` from opening the file.
pub fn open_shared(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;

        const FILE_SHARE_READ: u32 = 0x0000_0001;
        const FILE_SHARE_WRITE: u32 = 0x0000_0002;
        const FILE_SHARE_DELETE: u32 = 0x0000_0004;
        options.share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE);
    }

    options.open(path)
}

/// Read the file at `path` and return its last line, or `None` if it is empty.
///
/// Lines are terminated by `\n`, `\r\n`, or a lone `\r`. A final terminator does not start a new
/// line, so `"a\n"` has the single line `"a"` while `"a\n\n"` ends with an empty line.
/// Bytes that are not valid UTF-8 are replaced with `U+FFFD`.
///
/// The whole file is streamed, but only the most recent line is kept in memory. The handle is
/// closed before returning.
///
/// # Errors
///
/// Propagates any `io::Error` from opening or reading the file.
pub fn read_last_line(path: &Path) -> io::Result<Option<String>> {
    let mut reader = BufReader::new(open_shared(path)?);
    let mut buffer = Vec::new();
    let mut last_line = None;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
        }
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }

        // Any `\r` left in the chunk ends a line of its own.
        let line = buffer.rsplit(|&byte| byte == b'\r').next().unwrap_or_default();
        last_line = Some(String::from_utf8_lossy(line).into_owned());
    }

    Ok(last_line)
}
