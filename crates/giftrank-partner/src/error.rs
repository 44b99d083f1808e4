use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartnerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The envelope parsed but carried a non-zero `rCode`.
    #[error("partner API error (rCode {code}): {message}")]
    ApiError { code: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid partner base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("request signing failed: {0}")]
    Signing(String),
}
