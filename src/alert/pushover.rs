// src/alert/pushover.rs
//! Alerts pushed through the Pushover messages API.

use log::info;
use serde::Serialize;

use super::http::JsonPoster;
use super::{AlertService, DeliveryError};

const PUSHOVER_MESSAGES_URI: &str = "https://api.pushover.net/1/messages.json";

#[derive(Serialize)]
struct MessagePayload<'a> {
    message: &'a str,
    user: &'a str,
    token: &'a str,
}

/// An [`AlertService`] that sends each message as a Pushover notification.
pub struct PushoverService {
    poster: JsonPoster,
    endpoint: String,
    user: String,
    token: String,
}

impl PushoverService {
    pub(crate) fn new(poster: JsonPoster, user: &str, token: &str) -> Self {
        Self::with_endpoint(poster, PUSHOVER_MESSAGES_URI, user, token)
    }

    fn with_endpoint(poster: JsonPoster, endpoint: &str, user: &str, token: &str) -> Self {
        Self {
            poster,
            endpoint: endpoint.to_string(),
            user: user.to_string(),
            token: token.to_string(),
        }
    }
}

impl AlertService for PushoverService {
    fn send(&self, message: &str) -> Result<(), DeliveryError> {
        info!("Sending Pushover notification with message: {}", message);
        self.poster.post(
            &self.endpoint,
            &MessagePayload {
                message,
                user: &self.user,
                token: &self.token,
            },
        )
    }
}
