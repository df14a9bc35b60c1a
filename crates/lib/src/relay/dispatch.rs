//! Event dispatch: walk entries and messaging events, route each by shape, record outcomes.
//!
//! Events are handled one after another. A failure in one event is logged and recorded
//! in its outcome; the remaining events are still handled.

use crate::channels::{ChannelError, InboundEvent, MessagingEvent, WebhookPayload};
use crate::relay::postback::resolve_postback;
use crate::relay::reply::generate_reply;
use crate::relay::Relay;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("malformed messaging event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("delivery failed: {0}")]
    Delivery(#[from] ChannelError),
}

/// Where the delivered text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    Apology,
    Postback,
}

/// Result of handling one messaging event.
#[derive(Debug)]
pub enum EventOutcome {
    /// A reply was generated or resolved and delivered.
    Replied {
        recipient_id: String,
        text: String,
        source: ReplySource,
    },
    /// Quick-reply payload received; logged, no reply.
    QuickReply { sender_id: String, payload: String },
    /// Nothing to do for this event.
    Ignored {
        sender_id: String,
        reason: &'static str,
    },
    /// Decoding or delivery failed.
    Failed {
        sender_id: Option<String>,
        error: DispatchError,
    },
}

/// Outcomes of every messaging event in one webhook delivery, in payload order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<EventOutcome>,
}

impl DispatchReport {
    pub fn replied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::Replied { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EventOutcome::Failed { .. }))
            .count()
    }
}

impl Relay {
    /// Handle every messaging event of a page payload. Callers check `is_page` first.
    pub async fn dispatch(&self, payload: WebhookPayload, request_id: &str) -> DispatchReport {
        let mut report = DispatchReport::default();
        for entry in payload.entry {
            log::debug!(
                "[{}] entry {} with {} event(s)",
                request_id,
                entry.id.as_deref().unwrap_or("-"),
                entry.messaging.len()
            );
            for raw in entry.messaging {
                let outcome = match MessagingEvent::from_value(raw) {
                    Ok(event) => self.handle_event(&event, request_id).await,
                    Err(e) => EventOutcome::Failed {
                        sender_id: None,
                        error: e.into(),
                    },
                };
                log_outcome(request_id, &outcome);
                report.outcomes.push(outcome);
            }
        }
        report
    }

    /// Handle one decoded event.
    pub async fn handle_event(&self, event: &MessagingEvent, request_id: &str) -> EventOutcome {
        match event.classify() {
            InboundEvent::Text { sender_id, text } => {
                log::info!("[{}] message from {}", request_id, sender_id);
                let reply = generate_reply(self.backend.as_ref(), &text).await;
                let source = if reply.used_fallback() {
                    ReplySource::Apology
                } else {
                    ReplySource::Generated
                };
                self.deliver(sender_id, reply.text, source).await
            }
            InboundEvent::Postback { sender_id, payload } => {
                log::info!("[{}] postback {} from {}", request_id, payload, sender_id);
                let text = resolve_postback(&payload).to_string();
                self.deliver(sender_id, text, ReplySource::Postback).await
            }
            InboundEvent::QuickReply { sender_id, payload } => {
                log::info!("[{}] quick reply {} from {}", request_id, payload, sender_id);
                EventOutcome::QuickReply { sender_id, payload }
            }
            InboundEvent::Ignored { sender_id, reason } => {
                EventOutcome::Ignored { sender_id, reason }
            }
        }
    }

    async fn deliver(
        &self,
        recipient_id: String,
        text: String,
        source: ReplySource,
    ) -> EventOutcome {
        log::debug!("sending {:?} reply to {} via {}", source, recipient_id, self.channel.id());
        match self.channel.send_message(&recipient_id, &text).await {
            Ok(()) => EventOutcome::Replied {
                recipient_id,
                text,
                source,
            },
            Err(e) => EventOutcome::Failed {
                sender_id: Some(recipient_id),
                error: e.into(),
            },
        }
    }
}

fn log_outcome(request_id: &str, outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Replied {
            recipient_id,
            source,
            ..
        } => log::info!("[{}] replied to {} ({:?})", request_id, recipient_id, source),
        EventOutcome::QuickReply { .. } => {}
        EventOutcome::Ignored { sender_id, reason } => {
            log::debug!("[{}] ignored event from {}: {}", request_id, sender_id, reason)
        }
        EventOutcome::Failed { sender_id, error } => log::warn!(
            "[{}] event from {} failed: {}",
            request_id,
            sender_id.as_deref().unwrap_or("unknown sender"),
            error
        ),
    }
}
