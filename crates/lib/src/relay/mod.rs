//! Relay: turns verified webhook events into replies.
//!
//! Text goes through the LLM backend, postbacks through a fixed lookup, and every reply
//! leaves through the channel handle.

mod dispatch;
mod postback;
mod reply;

use crate::channels::{ChannelHandle, MessengerChannel};
use crate::config::Config;
use crate::llm::{GeminiClient, LlmBackend};
use std::sync::Arc;

pub use dispatch::{DispatchError, DispatchReport, EventOutcome, ReplySource};
pub use postback::{
    resolve_postback, ABOUT_REPLY, FALLBACK_REPLY, GET_STARTED_REPLY, HELP_REPLY,
};
pub use reply::{build_prompt, generate_reply, GeneratedReply, APOLOGY_REPLY};

/// Generation backend plus outbound channel. Holds no per-request state.
#[derive(Clone)]
pub struct Relay {
    backend: Arc<dyn LlmBackend>,
    channel: Arc<dyn ChannelHandle>,
}

impl Relay {
    pub fn new(backend: Arc<dyn LlmBackend>, channel: Arc<dyn ChannelHandle>) -> Self {
        Self { backend, channel }
    }

    /// Gemini backend and Messenger channel built from config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(GeminiClient::new(&config.gemini)),
            Arc::new(MessengerChannel::new(&config.messenger)),
        )
    }
}
