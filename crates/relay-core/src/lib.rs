//! # relay-core
//!
//! Core types and traits for the pi-relay payment relay.
//!
//! This crate provides:
//! - `PaymentPlatform` trait for the upstream payment platform
//! - `PaymentRecord` and `Expectations` for approval validation
//! - `RelayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{Expectations, PaymentPlatform};
//!
//! let record = platform.get_payment("pay_123").await?;
//! record.verify(&Expectations::new(Some(10.into()), Some("order-7".into())))?;
//!
//! let approved = platform.approve("pay_123").await?;
//! ```

pub mod error;
pub mod payment;
pub mod platform;

// Re-exports for convenience
pub use error::{MismatchField, RelayError, RelayResult};
pub use payment::{coerce_number, numbers_equal, Expectations, PaymentRecord};
pub use platform::{BoxedPaymentPlatform, PaymentPlatform};
