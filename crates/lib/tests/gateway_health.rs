//! Integration test: start the gateway on a free port, GET /health, assert health JSON.
//! Does not reach Gemini or the Graph API.

mod common;

use common::{free_port, start_relay};
use lib::config::Config;

fn bare_config() -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = free_port();
    config.server.environment = "test".to_string();
    config
}

async fn health(config: Config) -> serde_json::Value {
    let base = start_relay(config).await;
    let resp = reqwest::get(format!("{}/health", base))
        .await
        .expect("GET /health");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    resp.json().await.expect("parse JSON")
}

#[tokio::test]
async fn health_reports_unconfigured_credentials() {
    let json = health(bare_config()).await;
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
    assert_eq!(json.get("environment").and_then(|v| v.as_str()), Some("test"));
    assert_eq!(
        json.get("gemini_configured").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        json.get("messenger_configured").and_then(|v| v.as_bool()),
        Some(false)
    );
    let ts = json
        .get("timestamp")
        .and_then(|v| v.as_str())
        .expect("timestamp");
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {}", ts);
}

#[tokio::test]
async fn health_reports_configured_credentials() {
    let mut config = bare_config();
    config.gemini.api_key = Some("key".to_string());
    config.messenger.page_access_token = Some("token".to_string());
    let json = health(config).await;
    assert_eq!(
        json.get("gemini_configured").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        json.get("messenger_configured").and_then(|v| v.as_bool()),
        Some(true)
    );
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let base = start_relay(bare_config()).await;
    let resp = reqwest::get(format!("{}/nope", base)).await.expect("GET /nope");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json["error"], "not found");
    assert_eq!(json["path"], "/nope");
}
