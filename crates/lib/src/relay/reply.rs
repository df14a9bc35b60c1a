//! Reply generation: prompt template around the user's text, Gemini call, apology fallback.

use crate::llm::{LlmBackend, LlmError};

/// Sent when the generation call fails for any reason.
pub const APOLOGY_REPLY: &str =
    "Sorry, I'm having trouble responding right now. Please try again later.";

/// Generated reply text. `fallback` holds the generation error when the apology was used.
#[derive(Debug)]
pub struct GeneratedReply {
    pub text: String,
    pub fallback: Option<LlmError>,
}

impl GeneratedReply {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Prompt sent to the model for one customer message.
pub fn build_prompt(user_text: &str) -> String {
    format!(
        "You are a helpful assistant answering customers of a business on Facebook Messenger.\n\
         Reply to the customer's message below in a concise, professional tone.\n\
         Keep the answer short enough for a chat message and do not use Markdown.\n\
         \n\
         Customer message: {}\n\
         \n\
         Reply:",
        user_text
    )
}

/// Generate a reply for `user_text`. Never fails: errors become the apology text.
pub async fn generate_reply(backend: &dyn LlmBackend, user_text: &str) -> GeneratedReply {
    let prompt = build_prompt(user_text);
    match backend.generate(&prompt).await {
        Ok(text) => GeneratedReply {
            text,
            fallback: None,
        },
        Err(e) => {
            log::warn!("reply generation failed, sending apology: {}", e);
            GeneratedReply {
                text: APOLOGY_REPLY.to_string(),
                fallback: Some(e),
            }
        }
    }
}
