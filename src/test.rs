// src/test.rs
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tempfile::TempDir;

use crate::alert::{AlertService, DeliveryError};

/// A convenient alias to use `?` in tests.
///
/// There is a blanket `impl From<E: Error> for Box<dyn Error>`, meaning anything that implements
/// [`std::error::Error`] can be propagated using `?`.
pub type Result = std::result::Result<(), Box<dyn std::error::Error>>;

/// How long [`FakeServer::request`] waits for a request to arrive.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a log file with the given `contents` in a temporary directory.
///
/// This returns the handle to the temporary directory as well as the canonical path of the file,
/// since the directory will be unlinked when the `TempDir` value is dropped.
///
/// # Errors
///
/// Propagates any `io::Error`s that occur when creating the file.
pub fn log_file(contents: &str) -> io::Result<(TempDir, PathBuf)> {
    let tempdir = tempfile::tempdir()?;
    let path = fs::canonicalize(tempdir.path())?.join("console.log");
    fs::write(&path, contents)?;
    Ok((tempdir, path))
}

/// An [`AlertService`] that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingService {
    sent: Mutex<Vec<String>>,
    failing: bool,
}

impl RecordingService {
    /// A service that records messages, but then reports every delivery as failed.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: true,
        }
    }

    /// The messages sent so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the lock was poisoned by a panicking sender.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertService for RecordingService {
    fn send(&self, message: &str) -> std::result::Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.to_string());
        if self.failing {
            Err(DeliveryError::Status {
                url: "http://alerts.test/hook".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        } else {
            Ok(())
        }
    }
}

/// An HTTP request received by a [`FakeServer`].
#[derive(Debug)]
pub struct Request {
    /// The request method, e.g. `POST`.
    pub method: String,

    /// The request target, e.g. `/hook`.
    pub path: String,

    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Look up a header by (case-insensitive) `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Parse the request body as JSON.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json::Error` from parsing the body.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// A local HTTP server that answers every request with a fixed status, and records the requests.
///
/// The server runs an `axum` router on its own thread and runtime, so it can be used from
/// synchronous tests. It keeps running until the test process exits.
pub struct FakeServer {
    addr: SocketAddr,
    requests: mpsc::Receiver<Request>,
}

impl FakeServer {
    /// Start a server on a free local port that will answer requests with `status`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from binding the listener, or an `InvalidInput` error if
    /// `status` is not a valid status code.
    pub fn respond_with(status: u16) -> io::Result<Self> {
        let status = StatusCode::from_u16(status)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let (sender, requests) = mpsc::channel();
        let sender = Arc::new(Mutex::new(sender));
        let app = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let sender = Arc::clone(&sender);
                async move {
                    let request = Request {
                        method: method.to_string(),
                        path: uri.path().to_string(),
                        headers,
                        body,
                    };
                    sender.lock().unwrap().send(request).ok();
                    status
                }
            },
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()?;
        thread::spawn(move || {
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)?;
                axum::serve(listener, app).await
            })
        });

        Ok(Self { addr, requests })
    }

    /// A URL for a local port that nothing is listening on.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from binding the temporary listener.
    pub fn closed_url() -> io::Result<String> {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?;
        Ok(format!("http://{}/", addr))
    }

    /// The URL of `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait for the server to receive a request, and return it.
    ///
    /// # Errors
    ///
    /// Returns a `TimedOut` error if no request arrives within [`REQUEST_TIMEOUT`].
    pub fn request(&self) -> io::Result<Request> {
        self.requests
            .recv_timeout(REQUEST_TIMEOUT)
            .map_err(|error| io::Error::new(io::ErrorKind::TimedOut, error))
    }
}
