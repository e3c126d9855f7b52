//! # Payment Platform Trait
//!
//! The seam between the HTTP layer and the upstream payment platform.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentPlatform (trait)                   │
//! │  ├── get_payment()                                          │
//! │  ├── approve()                                              │
//! │  └── complete()                                             │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┴─────────────────┐
//!  ┌───────┴───────┐                   ┌───────┴───────┐
//!  │ PiPlatform    │                   │  in-memory    │
//!  │ (reqwest)     │                   │  (tests)      │
//!  └───────────────┘                   └───────────────┘
//! ```

use crate::error::RelayResult;
use crate::payment::PaymentRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Operations the relay performs against the payment platform.
///
/// Each method issues exactly one upstream call and never retries.
#[async_trait]
pub trait PaymentPlatform: Send + Sync {
    /// Fetch the platform's copy of a payment.
    async fn get_payment(&self, payment_id: &str) -> RelayResult<PaymentRecord>;

    /// Mark a payment as approved by the server.
    ///
    /// Returns the upstream response body unchanged.
    async fn approve(&self, payment_id: &str) -> RelayResult<Value>;

    /// Finalize a payment with its blockchain transaction id.
    ///
    /// Returns the upstream response body unchanged.
    async fn complete(&self, payment_id: &str, txid: &str) -> RelayResult<Value>;

    /// Platform name (for logging).
    fn platform_name(&self) -> &'static str;
}

/// Type alias for a shared platform (dynamic dispatch)
pub type BoxedPaymentPlatform = Arc<dyn PaymentPlatform>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl PaymentPlatform for Echo {
        async fn get_payment(&self, payment_id: &str) -> RelayResult<PaymentRecord> {
            let mut record = PaymentRecord::new(1, "memo");
            record.identifier = Some(payment_id.to_string());
            Ok(record)
        }

        async fn approve(&self, payment_id: &str) -> RelayResult<Value> {
            Ok(json!({ "identifier": payment_id }))
        }

        async fn complete(&self, _payment_id: &str, _txid: &str) -> RelayResult<Value> {
            Err(RelayError::Upstream {
                status: 409,
                body: json!({ "error": "already_completed" }),
            })
        }

        fn platform_name(&self) -> &'static str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_dynamic_dispatch() {
        let platform: BoxedPaymentPlatform = Arc::new(Echo);

        let record = platform.get_payment("pay_1").await.unwrap();
        assert_eq!(record.identifier.as_deref(), Some("pay_1"));

        let approved = platform.approve("pay_1").await.unwrap();
        assert_eq!(approved["identifier"], "pay_1");

        let err = platform.complete("pay_1", "tx").await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(platform.platform_name(), "echo");
    }
}
