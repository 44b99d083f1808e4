use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read collection file {path}: {source}")]
    CollectionFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse collection file: {0}")]
    CollectionFileParse(#[from] serde_yaml::Error),

    #[error("collection validation failed: {0}")]
    Validation(String),
}
