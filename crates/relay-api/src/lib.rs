//! # relay-api
//!
//! HTTP API layer for pi-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Approve/complete endpoints relaying to the Pi platform
//! - Health and (masked) config endpoints
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/config` | Configuration, API key masked |
//! | POST | `/approve` | Approve payment (optionally validated) |
//! | POST | `/complete` | Complete payment with txid |
//! | OPTIONS | `*` | CORS preflight |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
