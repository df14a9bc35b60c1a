//! Gateway HTTP server (single port): webhook handshake, webhook deliveries, health probe.

use crate::channels::WebhookPayload;
use crate::config::{self, Config};
use crate::gateway::error::{panic_response, ApiError};
use crate::gateway::protocol::{HealthStatus, VerifyQuery};
use crate::relay::Relay;
use crate::signature::{self, SIGNATURE_HEADER};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Shared state for the gateway: resolved config and the relay. Immutable after startup.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub relay: Relay,
}

impl GatewayState {
    pub fn new(config: Config, relay: Relay) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }

    /// State with the Gemini backend and Messenger channel built from config.
    pub fn from_config(config: Config) -> Self {
        let relay = Relay::from_config(&config);
        Self::new(config, relay)
    }
}

/// Routes plus JSON 404/405 fallbacks and a panic catcher that answers 500 JSON.
pub fn router(state: GatewayState) -> Router {
    with_fallbacks(routes()).with_state(state)
}

fn routes() -> Router<GatewayState> {
    Router::new()
        .route(
            "/webhook",
            get(verify_webhook)
                .post(receive_webhook)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health_http).fallback(method_not_allowed))
}

fn with_fallbacks(routes: Router<GatewayState>) -> Router<GatewayState> {
    routes
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Run the gateway server; binds to config.server.bind:config.server.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    warn_on_missing_credentials(&config);
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let environment = config.server.environment.clone();
    let state = GatewayState::from_config(config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("relay listening on {} ({})", bind_addr, environment);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

fn warn_on_missing_credentials(config: &Config) {
    if config::non_empty(config.messenger.app_secret.as_deref()).is_none() {
        log::warn!("APP_SECRET not set: every webhook delivery will be rejected");
    }
    if config::non_empty(config.messenger.verify_token.as_deref()).is_none() {
        log::warn!("VERIFY_TOKEN not set: webhook subscription handshakes will be rejected");
    }
    if !config.gemini_configured() {
        log::warn!("GEMINI_API_KEY not set: text messages will get the apology reply");
    }
    if !config.messenger_configured() {
        log::warn!("PAGE_ACCESS_TOKEN not set: replies cannot be delivered");
    }
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET /webhook: subscription handshake. Echoes hub.challenge when the verify token matches.
async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(query): Query<VerifyQuery>,
) -> Result<String, ApiError> {
    let expected = config::non_empty(state.config.messenger.verify_token.as_deref());
    if !query.is_valid(expected) {
        log::warn!("webhook verification failed");
        return Err(ApiError::Forbidden("verification failed".to_string()));
    }
    log::info!("webhook verified");
    Ok(query.challenge.unwrap_or_default())
}

/// POST /webhook: verifies the signature over the raw body, dispatches every event,
/// answers `OK` once dispatch has been attempted.
async fn receive_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let app_secret = config::non_empty(state.config.messenger.app_secret.as_deref());
    if let Err(e) = signature::verify_signature(app_secret, &body, provided) {
        log::warn!("[{}] webhook rejected: {}", request_id, e);
        return Err(ApiError::Forbidden(e.to_string()));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        log::warn!("[{}] invalid webhook body: {}", request_id, e);
        ApiError::BadRequest(format!("invalid JSON body: {}", e))
    })?;
    if !payload.is_page() {
        log::warn!("[{}] unsupported webhook object {:?}", request_id, payload.object);
        return Err(ApiError::UnsupportedObject(payload.object));
    }

    let report = state.relay.dispatch(payload, &request_id).await;
    log::info!(
        "[{}] processed {} event(s): {} replied, {} failed",
        request_id,
        report.outcomes.len(),
        report.replied(),
        report.failed()
    );
    Ok("OK")
}

/// GET /health returns service status and which credentials are configured.
async fn health_http(State(state): State<GatewayState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.config.server.environment.clone(),
        gemini_configured: state.config.gemini_configured(),
        messenger_configured: state.config.messenger_configured(),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
