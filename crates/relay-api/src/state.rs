//! # Application State
//!
//! Shared state for the Axum application.
//! Configuration is read once at startup and never mutated afterwards.

use relay_core::BoxedPaymentPlatform;
use relay_pi::{PiConfig, PiPlatform};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed by CORS; `*` allows all
    pub allowed_origins: Vec<String>,
    /// Compare the platform's payment record before approving
    pub validate: bool,
    /// Pi platform settings
    pub pi: PiConfig,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(3000),
            allowed_origins: parse_allowed_origins(lookup("ALLOWED_ORIGIN")),
            validate: lookup("VALIDATE").as_deref() != Some("0"),
            pi: PiConfig::from_vars(&lookup),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HOST {}: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// True when the allow-list contains the wildcard
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Comma-separated origins, trimmed; missing or empty means allow all
fn parse_allowed_origins(raw: Option<String>) -> Vec<String> {
    let origins: Vec<String> = raw
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        warn!("[BOOT] ALLOWED_ORIGIN not set; CORS will allow all (*) for testing only");
        return vec!["*".to_string()];
    }

    origins
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream payment platform
    pub platform: BoxedPaymentPlatform,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, platform: BoxedPaymentPlatform) -> Self {
        Self {
            platform,
            config: Arc::new(config),
        }
    }

    /// Create a new AppState backed by the Pi platform, configured from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let platform = PiPlatform::new(config.pi.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize Pi platform client: {}", e))?;

        Ok(Self::new(config, Arc::new(platform)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_vars(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_app_config_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.allowed_origins, vec!["*"]);
        assert!(config.allows_any_origin());
        assert!(config.validate);
        assert!(!config.pi.has_api_key());
    }

    #[test]
    fn test_allowed_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "ALLOWED_ORIGIN",
            "https://app.example.com, https://sandbox.example.com ,",
        )]);
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com", "https://sandbox.example.com"]
        );
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_validate_toggle() {
        assert!(!config_from(&[("VALIDATE", "0")]).validate);
        assert!(config_from(&[("VALIDATE", "1")]).validate);
        assert!(config_from(&[("VALIDATE", "false")]).validate);
    }

    #[test]
    fn test_bad_port_falls_back() {
        assert_eq!(config_from(&[("PORT", "eighty")]).port, 3000);
        assert_eq!(config_from(&[("PORT", "8080")]).port, 8080);
    }

    #[test]
    fn test_socket_addr() {
        let config = config_from(&[("HOST", "127.0.0.1"), ("PORT", "4000")]);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:4000");

        let config = config_from(&[("HOST", "::1")]);
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:3000");

        assert!(config_from(&[("HOST", "localhost")]).socket_addr().is_err());
    }
}
