//! Canned replies for postback buttons.

pub const GET_STARTED_REPLY: &str = "Welcome! 👋 How can I help you today?";
pub const HELP_REPLY: &str = "Just type your question and I'll do my best to help.";
pub const ABOUT_REPLY: &str = "I'm an AI assistant for this page, powered by Google Gemini.";
pub const FALLBACK_REPLY: &str = "Thanks for your message! How can I help you?";

/// Reply text for a postback payload; unknown payloads get the generic fallback.
pub fn resolve_postback(payload: &str) -> &'static str {
    match payload {
        "GET_STARTED" => GET_STARTED_REPLY,
        "HELP" => HELP_REPLY,
        "ABOUT" => ABOUT_REPLY,
        _ => FALLBACK_REPLY,
    }
}
