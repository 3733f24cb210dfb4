//! HTTP front end for the urlz shortener.
//!
//! Public redirects are throttled per client with a token bucket; the
//! create, update and delete routes are reserved for internal callers that
//! present the shared secret.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod server;
pub mod state;
pub mod telemetry;

pub use app::router;
pub use config::{ConfigError, GatewayConfig};
pub use state::AppState;
