//! # relay-pi
//!
//! Pi platform client for pi-relay.
//!
//! Implements `relay_core::PaymentPlatform` against the Pi platform REST API:
//!
//! | Operation     | Upstream call                      |
//! |---------------|------------------------------------|
//! | `get_payment` | `GET /payments/{id}`               |
//! | `approve`     | `POST /payments/{id}/approve`      |
//! | `complete`    | `POST /payments/{id}/complete`     |
//!
//! Calls are authorized with `Authorization: Key <PI_SERVER_API_KEY>`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_pi::{PiConfig, PiPlatform};
//! use relay_core::PaymentPlatform;
//!
//! let platform = PiPlatform::new(PiConfig::from_vars(|key| std::env::var(key).ok()))?;
//! let approved = platform.approve("pay_123").await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::PiPlatform;
pub use config::{PiConfig, DEFAULT_API_BASE_URL};
