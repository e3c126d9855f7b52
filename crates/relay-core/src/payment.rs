//! # Payment Types
//!
//! The platform-owned payment record and the caller's expectations about it.

use crate::error::{MismatchField, RelayError, RelayResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Payment record as held by the upstream platform.
///
/// Only `amount` and `memo` are inspected; every other field is carried
/// along untouched in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Platform identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Amount, kept as raw JSON so it can be echoed back unchanged.
    /// `None` only when the field is absent; an explicit `null` is `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Value>,

    /// Free-form memo attached by the client app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PaymentRecord {
    pub fn new(amount: impl Into<Value>, memo: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            memo: Some(memo.into()),
            ..Default::default()
        }
    }

    /// Check the record against the caller's expectations.
    ///
    /// Amount is checked before memo; the first mismatch is returned.
    /// A record without an amount never satisfies an amount expectation.
    pub fn verify(&self, expected: &Expectations) -> RelayResult<()> {
        if let Some(amount) = expected.amount.as_ref().filter(|v| !v.is_null()) {
            let matches = self
                .amount
                .as_ref()
                .is_some_and(|got| numbers_equal(got, amount));
            if !matches {
                return Err(RelayError::Mismatch {
                    field: MismatchField::Amount,
                    got: self.amount.clone().unwrap_or(Value::Null),
                    expected: amount.clone(),
                });
            }
        }

        if let Some(memo) = expected.memo.as_ref().filter(|v| !is_falsy(v)) {
            let got = self.memo.clone().map(Value::String);
            if got.as_ref() != Some(memo) {
                return Err(RelayError::Mismatch {
                    field: MismatchField::Memo,
                    got: got.unwrap_or(Value::Null),
                    expected: memo.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Values the caller expects the upstream record to carry, as sent.
///
/// A null amount skips the amount check; a falsy memo (`null`, `""`, `0`,
/// `false`) skips the memo check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expectations {
    pub amount: Option<Value>,
    pub memo: Option<Value>,
}

impl Expectations {
    pub fn new(amount: Option<Value>, memo: Option<Value>) -> Self {
        Self { amount, memo }
    }
}

/// Loose-client falsiness: null, false, zero and the empty string
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Coerce a JSON value to a number the way loosely-typed clients send them.
///
/// Returns `None` where the coercion yields no number at all (NaN).
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric equality after coercion. NaN equals nothing.
pub fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (coerce_number(a), coerce_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
