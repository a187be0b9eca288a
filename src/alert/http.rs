// src/alert/http.rs
//! Blocking JSON `POST`s for the alert services.

use std::io;
use std::time::Duration;

use serde::Serialize;

use super::DeliveryError;

/// How long a single alert request may take before it is abandoned.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts JSON bodies, blocking the calling thread until a response arrives.
///
/// `reqwest`'s client is async, so each poster owns a small single-threaded runtime that requests
/// are driven on.
pub(crate) struct JsonPoster {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl JsonPoster {
    /// # Errors
    ///
    /// Propagates any `io::Error` from building the runtime, or the HTTP client (e.g. if TLS
    /// could not be initialised).
    pub(crate) fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| io::Error::new(io::ErrorKind::Other, error))?;

        Ok(Self { runtime, client })
    }

    /// `POST` `body` as JSON to `url`.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Transport`] if the request could not be sent or the response was not
    ///   received.
    /// - [`DeliveryError::Status`] if the response status is not 2xx.
    pub(crate) fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(), DeliveryError> {
        self.runtime.block_on(self.post_async(url, body))
    }

    async fn post_async<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(), DeliveryError> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status {
                url: url.to_string(),
                status,
            })
        }
    }
}
