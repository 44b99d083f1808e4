use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Stage-B product scoring weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub quality: f64,
    pub diversity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            relevance: 1.0,
            quality: 5.0,
            diversity: 10.0,
        }
    }
}

/// Partner API key pair. Only required by commands that call the API.
#[derive(Clone, PartialEq, Eq)]
pub struct PartnerCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for PartnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerCredentials")
            .field("access_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// `GIFTRANK_LOG_LEVEL`; `None` defers to `RUST_LOG`.
    pub log_level: Option<String>,
    pub data_dir: PathBuf,
    pub collection_path: PathBuf,
    pub partner_access_key: Option<String>,
    pub partner_secret_key: Option<String>,
    pub partner_base_url: String,
    pub partner_timeout_secs: u64,
    pub user_agent: String,
    pub search_limit: u32,
    pub rate_limit_tokens: u32,
    pub rate_limit_window_secs: u64,
    pub weights: ScoringWeights,
}

impl AppConfig {
    /// Path of the persisted product catalog snapshot.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("products.json")
    }

    /// Path of the persisted keyword ranking snapshot.
    #[must_use]
    pub fn rankings_path(&self) -> PathBuf {
        self.data_dir.join("rankings.json")
    }

    /// Returns the partner key pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent or blank
    /// key. Callers must check this before attempting any partner call.
    pub fn partner_credentials(&self) -> Result<PartnerCredentials, ConfigError> {
        let present = |value: &Option<String>, var: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
        };
        Ok(PartnerCredentials {
            access_key: present(&self.partner_access_key, "COUPANG_ACCESS_KEY")?,
            secret_key: present(&self.partner_secret_key, "COUPANG_SECRET_KEY")?,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("collection_path", &self.collection_path)
            .field(
                "partner_access_key",
                &self.partner_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "partner_secret_key",
                &self.partner_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("partner_base_url", &self.partner_base_url)
            .field("partner_timeout_secs", &self.partner_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_limit", &self.search_limit)
            .field("rate_limit_tokens", &self.rate_limit_tokens)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("weights", &self.weights)
            .finish()
    }
}
