use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} responded with HTTP {status}")]
    Http { status: u16, url: String },

    #[error("Unexpected response shape: {message}")]
    MalformedResponse { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hash error: {message}")]
    PasswordHash { message: String },

    #[error("Sync task stopped: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SyncError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 擷取或正規化階段的失敗，排程視為同一類
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::MalformedResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
