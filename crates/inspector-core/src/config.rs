use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const USER_STORAGE_KEY: &str = "persist:user";
pub const POSITION_STORAGE_KEY: &str = "userInfoPanelPosition";
/// Page global an operator may assign a JSON config object to.
pub const CONFIG_GLOBAL: &str = "__USER_INSPECTOR_CONFIG__";
pub const DEFAULT_RESET_DOMAINS: [&str; 2] = ["get-honey.ai", "get-honey.online"];

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 1_000;
pub const DEFAULT_CLEAR_FEEDBACK_MS: u64 = 1_200;
pub const DEFAULT_ACTIVATION_FAILURE_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Malformed(String),
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
    #[error("{field} must not be empty")]
    EmptyStorageKey { field: &'static str },
    #[error("api base must use http:// or https:// and include a host")]
    InvalidApiBase,
    #[error("hostname must not be empty")]
    EmptyHostname,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivationSettings {
    /// Replaces the `https://api.<domain>` derivation when set.
    pub api_base_override: Option<String>,
    pub credentials: Option<Credentials>,
    /// Site domain (without `www.`) to product identifier.
    pub products: BTreeMap<String, String>,
}

impl ActivationSettings {
    pub fn api_base(&self, hostname: &str) -> Result<String, ConfigError> {
        if let Some(base) = self.api_base_override.as_deref() {
            return normalize_base_url(base);
        }
        let domain = site_domain(hostname);
        if domain.is_empty() {
            return Err(ConfigError::EmptyHostname);
        }
        Ok(format!("https://api.{domain}"))
    }

    #[must_use]
    pub fn product_for(&self, hostname: &str) -> Option<&str> {
        self.products
            .get(site_domain(hostname))
            .map(String::as_str)
            .filter(|product| !product.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub user_storage_key: String,
    pub position_storage_key: String,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub copy_feedback_ms: u64,
    pub clear_feedback_ms: u64,
    pub activation_failure_ms: u64,
    pub reset_allowed_domains: Vec<String>,
    pub activation: ActivationSettings,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            user_storage_key: USER_STORAGE_KEY.to_string(),
            position_storage_key: POSITION_STORAGE_KEY.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            copy_feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
            clear_feedback_ms: DEFAULT_CLEAR_FEEDBACK_MS,
            activation_failure_ms: DEFAULT_ACTIVATION_FAILURE_MS,
            reset_allowed_domains: DEFAULT_RESET_DOMAINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            activation: ActivationSettings::default(),
        }
    }
}

impl OverlayConfig {
    /// Parses and validates an operator-supplied config object. Missing
    /// fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| ConfigError::Malformed(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey {
                field: "userStorageKey",
            });
        }
        if self.position_storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey {
                field: "positionStorageKey",
            });
        }
        for (field, value) in [
            ("pollIntervalMs", self.poll_interval_ms),
            ("copyFeedbackMs", self.copy_feedback_ms),
            ("clearFeedbackMs", self.clear_feedback_ms),
            ("activationFailureMs", self.activation_failure_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        if let Some(base) = self.activation.api_base_override.as_deref() {
            normalize_base_url(base)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    #[must_use]
    pub fn clear_feedback(&self) -> Duration {
        Duration::from_millis(self.clear_feedback_ms)
    }

    #[must_use]
    pub fn activation_failure(&self) -> Duration {
        Duration::from_millis(self.activation_failure_ms)
    }
}

/// Hostname with a leading `www.` removed.
#[must_use]
pub fn site_domain(hostname: &str) -> &str {
    let hostname = hostname.trim();
    hostname.strip_prefix("www.").unwrap_or(hostname)
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiBase);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidApiBase);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidApiBase);
    }
    Ok(trimmed.to_string())
}
