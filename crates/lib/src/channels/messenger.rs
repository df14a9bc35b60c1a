//! Messenger channel: Send API via the Graph API (`/me/messages`).

use crate::channels::{ChannelError, ChannelHandle};
use crate::config::{self, MessengerConfig};
use async_trait::async_trait;
use serde::Serialize;

/// Messenger rejects text messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    messaging_type: &'static str,
    message: OutgoingText<'a>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct OutgoingText<'a> {
    text: &'a str,
}

/// Messenger channel connector: delivers replies with the page access token.
pub struct MessengerChannel {
    id: String,
    send_url: String,
    page_access_token: Option<String>,
    client: reqwest::Client,
}

impl MessengerChannel {
    pub fn new(config: &MessengerConfig) -> Self {
        let send_url = format!(
            "{}/{}/me/messages",
            config.graph_api_base.trim_end_matches('/'),
            config.graph_api_version.trim_matches('/')
        );
        Self {
            id: "messenger".to_string(),
            send_url,
            page_access_token: config::non_empty(config.page_access_token.as_deref())
                .map(str::to_string),
            client: reqwest::Client::new(),
        }
    }

    /// Send a text message as a RESPONSE to the user's message. Text over the platform
    /// limit is truncated. The page token goes in the Authorization header.
    pub async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), ChannelError> {
        let token = self
            .page_access_token
            .as_deref()
            .ok_or(ChannelError::NotConfigured)?;
        let body = SendRequest {
            recipient: Recipient { id: recipient_id },
            messaging_type: "RESPONSE",
            message: OutgoingText {
                text: truncate_message(text),
            },
        };
        let res = self
            .client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelHandle for MessengerChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, recipient_id: &str, text: &str) -> Result<(), ChannelError> {
        self.send_text(recipient_id, text).await
    }
}

/// Longest prefix of `text` within MAX_MESSAGE_CHARS characters.
pub fn truncate_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
