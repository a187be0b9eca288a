// src/alert/mod.rs

//! Alert channels that messages are delivered to.
//!
//! An [`AlertService`] takes a message and delivers it somewhere a human will see it. The concrete
//! services ([`discord`] and [`pushover`]) each issue a single JSON `POST` per message. [`build`]
//! selects the service for a configured [`Method`].

pub mod discord;
mod http;
pub mod pushover;

use std::fmt;
use std::io;

use self::discord::DiscordService;
use self::http::JsonPoster;
use self::pushover::PushoverService;

/// Something that can deliver alert messages.
pub trait AlertService: Send + Sync {
    /// Deliver `message`.
    ///
    /// This is attempted exactly once. Failed deliveries are not retried.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the message could not be delivered.
    fn send(&self, message: &str) -> Result<(), DeliveryError>;
}

impl<S: AlertService + ?Sized> AlertService for Box<S> {
    fn send(&self, message: &str) -> Result<(), DeliveryError> {
        (**self).send(message)
    }
}

/// The configured alert channel, with its credentials.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Method {
    /// Post to a Discord webhook.
    Discord {
        /// The webhook URL, including its token.
        webhook_uri: String,
    },

    /// Push a notification through the Pushover API.
    Pushover {
        /// The Pushover user (or group) key to notify.
        user: String,

        /// The Pushover application token.
        token: String,
    },
}

impl Method {
    /// The name used to select this method in configuration.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Method::Discord { .. } => "Discord",
            Method::Pushover { .. } => "Pushover",
        }
    }
}

/// Construct the [`AlertService`] for `method`.
///
/// # Errors
///
/// Propagates any `io::Error` from setting up the HTTP client.
pub fn build(method: &Method) -> io::Result<Box<dyn AlertService>> {
    let poster = JsonPoster::new()?;
    Ok(match method {
        Method::Discord { webhook_uri } => Box::new(DiscordService::new(poster, webhook_uri)),
        Method::Pushover { user, token } => Box::new(PushoverService::new(poster, user, token)),
    })
}

/// Possible error situations when delivering an alert.
#[derive(Debug)]
pub enum DeliveryError {
    /// The request could not be sent, or no response was received.
    Transport(reqwest::Error),

    /// The alert channel responded with a non-success status.
    Status {
        /// The URL that was posted to.
        url: String,

        /// The status returned.
        status: reqwest::StatusCode,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeliveryError::Transport(_) => write!(f, "failed to send alert"),
            DeliveryError::Status { url, status } => {
                write!(f, "alert rejected by {}: {}", redact(url), status)
            }
        }
    }
}

impl std::error::Error for DeliveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeliveryError::Transport(error) => Some(error),
            DeliveryError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(error: reqwest::Error) -> Self {
        DeliveryError::Transport(error.without_url())
    }
}

/// Strip the path and query from `url`, since webhook URLs carry their secret in the path.
fn redact(url: &str) -> &str {
    let after_scheme = url.find("://").map_or(0, |index| index + 3);
    match url[after_scheme..].find('/') {
        Some(index) => &url[..after_scheme + index],
        None => url,
    }
}
