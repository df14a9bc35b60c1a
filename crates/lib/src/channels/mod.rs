//! Communication channels (Messenger).
//!
//! Inbound webhook payload types and their classification live in `inbound`; outbound
//! delivery goes through the `ChannelHandle` trait so the relay can be driven by a fake
//! channel in tests.

mod inbound;
mod messenger;

use async_trait::async_trait;

pub use inbound::{
    Entry, InboundEvent, Message, MessagingEvent, Party, Postback, QuickReply, WebhookPayload,
};
pub use messenger::{truncate_message, MessengerChannel, MAX_MESSAGE_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("page access token not configured")]
    NotConfigured,
    #[error("send request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("send api error: {status} {body}")]
    Api { status: u16, body: String },
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.without_url())
    }
}

/// Handle to an outbound channel.
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "messenger").
    fn id(&self) -> &str;
    /// Send a text message to a recipient (page-scoped user id). One attempt, no retry.
    async fn send_message(&self, recipient_id: &str, text: &str) -> Result<(), ChannelError>;
}
