//! Gateway: HTTP surface of the relay.
//!
//! `GET /webhook` answers the subscription handshake, `POST /webhook` receives signed
//! event deliveries, `GET /health` reports status. Anything else is a JSON 404.

mod error;
mod protocol;
mod server;

pub use error::ApiError;
pub use protocol::{HealthStatus, VerifyQuery};
pub use server::{router, run_gateway, GatewayState};
