//! # Pi Platform Client
//!
//! `PaymentPlatform` implementation over the Pi platform REST API.
//! Each operation is one HTTP call; failures are returned as-is, never retried.

use crate::config::PiConfig;
use async_trait::async_trait;
use relay_core::{PaymentPlatform, PaymentRecord, RelayError, RelayResult};
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Client for the Pi platform payments API
pub struct PiPlatform {
    config: PiConfig,
    base_url: Url,
    client: Client,
}

impl PiPlatform {
    /// Create a new Pi platform client
    pub fn new(config: PiConfig) -> RelayResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            RelayError::Configuration(format!(
                "Invalid Pi API base URL {}: {}",
                config.api_base_url, e
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(RelayError::Configuration(format!(
                "Pi API base URL cannot carry paths: {}",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| RelayError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// `{base}/payments/{id}[/{action}]`, with the id encoded as one path segment
    fn payment_url(&self, payment_id: &str, action: Option<&str>) -> RelayResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                RelayError::Configuration("Pi API base URL cannot carry paths".to_string())
            })?;
            segments.pop_if_empty().push("payments").push(payment_id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_header() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    /// Send a request and read the JSON body, mapping failures onto `RelayError`
    async fn send(&self, request: RequestBuilder) -> RelayResult<Value> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!("Pi API error: status={}, body={}", status, body);
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body: upstream_error_body(status, &body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            RelayError::Serialization(format!("Failed to parse Pi response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentPlatform for PiPlatform {
    #[instrument(skip(self))]
    async fn get_payment(&self, payment_id: &str) -> RelayResult<PaymentRecord> {
        let url = self.payment_url(payment_id, None)?;
        let body = self.send(self.client.get(url)).await?;

        serde_json::from_value(body).map_err(|e| {
            RelayError::Serialization(format!("Failed to parse Pi payment: {}", e))
        })
    }

    #[instrument(skip(self))]
    async fn approve(&self, payment_id: &str) -> RelayResult<Value> {
        let url = self.payment_url(payment_id, Some("approve"))?;
        self.send(self.client.post(url).json(&json!({}))).await
    }

    #[instrument(skip(self))]
    async fn complete(&self, payment_id: &str, txid: &str) -> RelayResult<Value> {
        let url = self.payment_url(payment_id, Some("complete"))?;
        self.send(self.client.post(url).json(&CompleteBody { txid })).await
    }

    fn platform_name(&self) -> &'static str {
        "pi"
    }
}

#[derive(Debug, Serialize)]
struct CompleteBody<'a> {
    txid: &'a str,
}

/// Upstream error body: JSON when it parses, the raw text otherwise,
/// and a generic message when there is no body at all.
fn upstream_error_body(status: StatusCode, body: &str) -> Value {
    if body.trim().is_empty() {
        return json!({
            "message": format!("Request failed with status code {}", status.as_u16())
        });
    }

    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "server_key_0123456789";

    fn platform_for(server: &MockServer) -> PiPlatform {
        let config = PiConfig::new(KEY).with_api_base_url(server.uri());
        PiPlatform::new(config).unwrap()
    }

    #[test]
    fn test_payment_url() {
        let config = PiConfig::new(KEY);
        let platform = PiPlatform::new(config).unwrap();

        let url = platform.payment_url("pay_123", Some("approve")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.minepi.com/v2/payments/pay_123/approve"
        );

        let url = platform.payment_url("a/b", None).unwrap();
        assert_eq!(url.as_str(), "https://api.minepi.com/v2/payments/a%2Fb");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = PiConfig::new(KEY).with_api_base_url("not a url");
        assert!(matches!(
            PiPlatform::new(config),
            Err(RelayError::Configuration(_))
        ));
    }

    #[test]
    fn test_upstream_error_body() {
        assert_eq!(
            upstream_error_body(StatusCode::NOT_FOUND, ""),
            json!({"message": "Request failed with status code 404"})
        );
        assert_eq!(
            upstream_error_body(StatusCode::BAD_GATEWAY, "Bad Gateway"),
            json!("Bad Gateway")
        );
        assert_eq!(
            upstream_error_body(StatusCode::BAD_REQUEST, r#"{"error":"already_approved"}"#),
            json!({"error": "already_approved"})
        );
    }

    #[tokio::test]
    async fn test_get_payment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay_123"))
            .and(header("Authorization", "Key server_key_0123456789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "identifier": "pay_123",
                "amount": 10,
                "memo": "order-7",
                "status": {"developer_approved": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = platform_for(&server).get_payment("pay_123").await.unwrap();
        assert_eq!(record.amount, Some(json!(10)));
        assert_eq!(record.memo.as_deref(), Some("order-7"));
    }

    #[tokio::test]
    async fn test_approve_relays_body() {
        let server = MockServer::start().await;
        let upstream = json!({"identifier": "pay_123", "status": {"developer_approved": true}});
        Mock::given(method("POST"))
            .and(path("/payments/pay_123/approve"))
            .and(header("Authorization", "Key server_key_0123456789"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let body = platform_for(&server).approve("pay_123").await.unwrap();
        assert_eq!(body, upstream);
    }

    #[tokio::test]
    async fn test_complete_sends_txid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/pay_123/complete"))
            .and(body_json(json!({"txid": "tx_abc"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"transaction": {"txid": "tx_abc"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = platform_for(&server)
            .complete("pay_123", "tx_abc")
            .await
            .unwrap();
        assert_eq!(body["transaction"]["txid"], "tx_abc");
    }

    #[tokio::test]
    async fn test_upstream_error_is_relayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/pay_123/approve"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "payment_not_found", "error_message": "nope"})),
            )
            .mount(&server)
            .await;

        let err = platform_for(&server).approve("pay_123").await.unwrap_err();
        match err {
            RelayError::Upstream { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body["error"], "payment_not_found");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key_sends_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/pay_123/approve"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = PiConfig::from_vars(|_| None).with_api_base_url(server.uri());
        let err = PiPlatform::new(config)
            .unwrap()
            .approve("pay_123")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_unparseable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay_123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = platform_for(&server).get_payment("pay_123").await.unwrap_err();
        assert!(matches!(err, RelayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_network_error() {
        let config = PiConfig::new(KEY).with_api_base_url("http://127.0.0.1:1");
        let err = PiPlatform::new(config)
            .unwrap()
            .approve("pay_123")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Network(_)));
        assert_eq!(err.status_code(), 500);
    }
}
