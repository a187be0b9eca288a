// src/alert/discord.rs
//! Alerts posted to a Discord channel webhook.

use log::info;
use serde::Serialize;

use super::http::JsonPoster;
use super::{AlertService, DeliveryError};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// An [`AlertService`] that posts each message to a Discord webhook.
pub struct DiscordService {
    poster: JsonPoster,
    webhook_uri: String,
}

impl DiscordService {
    pub(crate) fn new(poster: JsonPoster, webhook_uri: &str) -> Self {
        Self {
            poster,
            webhook_uri: webhook_uri.to_string(),
        }
    }
}

impl AlertService for DiscordService {
    fn send(&self, message: &str) -> Result<(), DeliveryError> {
        info!("Sending Discord webhook with message: {}", message);
        self.poster
            .post(&self.webhook_uri, &WebhookPayload { content: message })
    }
}
