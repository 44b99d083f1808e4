use crate::app_config::{AppConfig, Environment, ScoringWeights};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing/validation core, decoupled from the process environment so tests
/// can drive it with a plain `HashMap` lookup.
///
/// Partner credentials are optional here; commands that call the partner API
/// check them via [`AppConfig::partner_credentials`].
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_weight = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(var, format!("must be a finite non-negative number, got {value}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("GIFTRANK_ENV", "development"))?;
    let log_level = lookup("GIFTRANK_LOG_LEVEL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let data_dir = PathBuf::from(or_default("GIFTRANK_DATA_DIR", "./data"));
    let collection_path = PathBuf::from(or_default(
        "GIFTRANK_COLLECTION_PATH",
        "./config/collection.yaml",
    ));

    let partner_access_key = lookup("COUPANG_ACCESS_KEY").ok();
    let partner_secret_key = lookup("COUPANG_SECRET_KEY").ok();
    let partner_base_url = or_default(
        "GIFTRANK_PARTNER_BASE_URL",
        "https://api-gateway.coupang.com",
    );
    let partner_timeout_secs = parse_u64("GIFTRANK_PARTNER_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GIFTRANK_USER_AGENT", "giftrank/0.1 (keyword-collector)");

    let search_limit = parse_u32("GIFTRANK_SEARCH_LIMIT", "5")?;
    if search_limit == 0 {
        return Err(invalid("GIFTRANK_SEARCH_LIMIT", "must be at least 1".to_string()));
    }

    let rate_limit_tokens = parse_u32("GIFTRANK_RATE_LIMIT_TOKENS", "70")?;
    if rate_limit_tokens < 2 {
        return Err(invalid(
            "GIFTRANK_RATE_LIMIT_TOKENS",
            "must be at least 2 (one search plus one deep-link call per keyword)".to_string(),
        ));
    }

    let rate_limit_window_secs = parse_u64("GIFTRANK_RATE_LIMIT_WINDOW_SECS", "60")?;
    if rate_limit_window_secs == 0 {
        return Err(invalid("GIFTRANK_RATE_LIMIT_WINDOW_SECS", "must be at least 1".to_string()));
    }

    let weights = ScoringWeights {
        relevance: parse_weight("GIFTRANK_WEIGHT_RELEVANCE", "1.0")?,
        quality: parse_weight("GIFTRANK_WEIGHT_QUALITY", "5.0")?,
        diversity: parse_weight("GIFTRANK_WEIGHT_DIVERSITY", "10.0")?,
    };

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        collection_path,
        partner_access_key,
        partner_secret_key,
        partner_base_url,
        partner_timeout_secs,
        user_agent,
        search_limit,
        rate_limit_tokens,
        rate_limit_window_secs,
        weights,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GIFTRANK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
