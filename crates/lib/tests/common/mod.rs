//! Shared helpers for gateway integration tests: free ports, fake upstream APIs
//! (Gemini and Graph) that record every request, and a relay started on a free port.
#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use lib::config::Config;
use lib::gateway;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const VERIFY_TOKEN: &str = "verify-me";
pub const APP_SECRET: &str = "test-app-secret";
pub const PAGE_TOKEN: &str = "page-token";
pub const GEMINI_KEY: &str = "gemini-key";
pub const GEMINI_TEXT: &str = "Hello from Gemini";

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// One request received by a fake upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct FakeState {
    status: StatusCode,
    response: serde_json::Value,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// Fake upstream API answering every request with a fixed status and JSON body.
pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    pub async fn spawn(status: StatusCode, response: serde_json::Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(FakeState {
            status,
            response,
            requests: requests.clone(),
        });
        let app = Router::new().fallback(record).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake upstream");
        let addr = listener.local_addr().expect("local_addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Gemini stand-in returning one candidate with GEMINI_TEXT.
    pub async fn gemini_ok() -> Self {
        Self::spawn(
            StatusCode::OK,
            serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": GEMINI_TEXT }] },
                    "finishReason": "STOP"
                }]
            }),
        )
        .await
    }

    /// Graph stand-in accepting every send.
    pub async fn graph_ok() -> Self {
        Self::spawn(
            StatusCode::OK,
            serde_json::json!({ "recipient_id": "USER_1", "message_id": "m_1" }),
        )
        .await
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn record(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        query: uri.query().unwrap_or("").to_string(),
        headers,
        body,
    });
    (state.status, Json(state.response.clone()))
}

/// Fully configured relay pointing at the given fake upstreams.
pub fn relay_config(gemini: &FakeUpstream, graph: &FakeUpstream) -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = free_port();
    config.server.environment = "test".to_string();
    config.gemini.api_key = Some(GEMINI_KEY.to_string());
    config.gemini.base_url = gemini.base_url.clone();
    config.messenger.verify_token = Some(VERIFY_TOKEN.to_string());
    config.messenger.app_secret = Some(APP_SECRET.to_string());
    config.messenger.page_access_token = Some(PAGE_TOKEN.to_string());
    config.messenger.graph_api_base = graph.base_url.clone();
    config
}

/// Start the gateway and wait until /health answers. Returns the base URL.
/// The server task is left running when the test ends.
pub async fn start_relay(config: Config) -> String {
    let base = format!("http://127.0.0.1:{}", config.server.port);
    tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });

    let client = reqwest::Client::new();
    let url = format!("{}/health", base);
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => return base,
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "GET {} did not return 200 within 5s; last error: {:?}",
        url, last_err
    );
}

/// Page payload with the given messaging events in one entry.
pub fn page_payload(events: Vec<serde_json::Value>) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "object": "page",
        "entry": [{ "id": "PAGE_1", "time": 1700000000000i64, "messaging": events }]
    }))
    .expect("serialize payload")
}

pub fn text_event(sender: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "sender": { "id": sender },
        "recipient": { "id": "PAGE_1" },
        "timestamp": 1700000000000i64,
        "message": { "mid": "m_abc", "text": text }
    })
}

pub fn postback_event(sender: &str, payload: &str) -> serde_json::Value {
    serde_json::json!({
        "sender": { "id": sender },
        "recipient": { "id": "PAGE_1" },
        "timestamp": 1700000000000i64,
        "postback": { "title": "Button", "payload": payload }
    })
}

/// POST /webhook with a correct signature for `body`.
pub async fn post_signed(base: &str, body: Vec<u8>) -> reqwest::Response {
    let signature = lib::signature::sign(APP_SECRET, &body);
    reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("content-type", "application/json")
        .header("x-hub-signature-256", signature)
        .body(body)
        .send()
        .await
        .expect("POST /webhook")
}
