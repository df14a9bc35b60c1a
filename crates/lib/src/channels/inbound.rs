//! Inbound webhook payload (`object: "page"`) and per-event classification.
//!
//! Entries and messaging events are kept as raw JSON at the envelope level so that one
//! malformed event can be reported without rejecting its siblings.

use serde::Deserialize;

/// Webhook POST body: `{ "object": "page", "entry": [ { "messaging": [ ... ] } ] }`.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    /// Raw messaging events; decode each with `MessagingEvent::from_value`.
    #[serde(default)]
    pub messaging: Vec<serde_json::Value>,
}

impl WebhookPayload {
    pub fn is_page(&self) -> bool {
        self.object == "page"
    }
}

/// One messaging event. Exactly one of message / postback is normally present.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingEvent {
    pub sender: Party,
    pub recipient: Party,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub quick_reply: Option<QuickReply>,
    #[serde(default)]
    pub is_echo: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickReply {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    #[serde(default)]
    pub title: Option<String>,
    pub payload: String,
}

/// What the relay should do with an event, decided by its structural shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Free text: generate a reply.
    Text { sender_id: String, text: String },
    /// Button click: answer with a canned reply.
    Postback { sender_id: String, payload: String },
    /// Quick-reply button: logged only.
    QuickReply { sender_id: String, payload: String },
    /// Nothing to answer (echo, attachment-only, blank text, delivery/read receipts).
    Ignored { sender_id: String, reason: &'static str },
}

impl MessagingEvent {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Classify the event. Quick replies are checked before plain text because a
    /// quick-reply message carries the button title as its text.
    pub fn classify(&self) -> InboundEvent {
        let sender_id = self.sender.id.clone();
        if let Some(ref message) = self.message {
            if message.is_echo {
                return InboundEvent::Ignored {
                    sender_id,
                    reason: "echo of an outbound message",
                };
            }
            if let Some(ref quick_reply) = message.quick_reply {
                return InboundEvent::QuickReply {
                    sender_id,
                    payload: quick_reply.payload.clone(),
                };
            }
            return match message.text.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => InboundEvent::Text {
                    sender_id,
                    text: text.to_string(),
                },
                _ => InboundEvent::Ignored {
                    sender_id,
                    reason: "message without text",
                },
            };
        }
        if let Some(ref postback) = self.postback {
            return InboundEvent::Postback {
                sender_id,
                payload: postback.payload.clone(),
            };
        }
        InboundEvent::Ignored {
            sender_id,
            reason: "unsupported event type",
        }
    }
}
