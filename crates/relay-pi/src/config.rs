//! # Pi Platform Configuration
//!
//! Configuration for the Pi platform client.
//! The server API key comes from the process environment and is never logged raw.

use tracing::warn;

/// Default Pi platform API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.minepi.com/v2";

/// Pi platform API configuration
#[derive(Clone)]
pub struct PiConfig {
    /// Server API key. Missing keys are allowed; upstream rejects the calls.
    pub api_key: Option<String>,

    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,
}

impl PiConfig {
    /// Build configuration from a variable lookup.
    ///
    /// Recognized vars:
    /// - `PI_SERVER_API_KEY` (warned about when missing)
    /// - `PI_API_BASE_URL` (optional)
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("PI_SERVER_API_KEY").filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("[BOOT] Missing PI_SERVER_API_KEY env var; upstream calls will be rejected");
        }

        let api_base_url = lookup("PI_API_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Self {
            api_key,
            api_base_url,
        }
    }

    /// Create config with an explicit key (for testing)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get authorization header value, if a key is configured
    pub fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| format!("Key {}", key))
    }

    /// Key reduced to its first 6 and last 4 characters.
    ///
    /// Keys of 10 characters or fewer would be fully revealed that way,
    /// so only the ellipsis is returned for them.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

impl std::fmt::Debug for PiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiConfig")
            .field("api_key", &self.masked_key())
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn mask_secret(secret: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= HEAD + TAIL {
        return "…".to_string();
    }

    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{}…{}", head, tail)
}
