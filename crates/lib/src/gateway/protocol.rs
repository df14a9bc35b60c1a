//! HTTP wire types for the webhook handshake and health probe.

use serde::{Deserialize, Serialize};

/// Query of the subscription handshake: `GET /webhook?hub.mode=subscribe&hub.verify_token=..&hub.challenge=..`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// True when the token matches the configured one and the mode, if given, is "subscribe".
    /// An unset or blank configured token never matches.
    pub fn is_valid(&self, expected_token: Option<&str>) -> bool {
        let Some(expected) = expected_token.filter(|t| !t.is_empty()) else {
            return false;
        };
        let mode_ok = self.mode.as_deref().map_or(true, |m| m == "subscribe");
        mode_ok && self.verify_token.as_deref() == Some(expected)
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub environment: String,
    pub gemini_configured: bool,
    pub messenger_configured: bool,
}
