//! Feedback Sentiment Server
//!
//! HTTP front end for the sentiment classifier:
//! - `POST /analyze` classifies `{"text": ...}` and always answers with a
//!   label and score, falling back to `NEUTRAL`/0.5 on classifier failure
//! - `GET /` reports that the service is running
//!
//! Every response passes through a CORS gate restricted to the configured
//! browser origins.

pub mod app;
pub mod cli;
pub mod config;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use app::{build_app, build_cors, run_server};
pub use cli::Cli;
pub use config::{CorsConfig, MetricsConfig, ServerConfig};
pub use state::AppState;
