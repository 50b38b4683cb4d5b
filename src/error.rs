use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl AppError {
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    pub fn remote<S: Into<String>>(msg: S) -> Self {
        Self::Remote(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn is_pii_safe(&self) -> bool {
        match self {
            Self::Database(_) | Self::Network(_) | Self::Anyhow(_) => false,
            Self::Auth(_) | Self::Remote(_) | Self::Storage(_)
            | Self::InvalidInput(_) | Self::Config(_)
            | Self::NotFound(_) | Self::PermissionDenied(_) => true,
        }
    }

    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            self.to_string()
        } else {
            match self {
                Self::Database(_) => "Local cache operation failed".to_string(),
                Self::Network(_) => "Network request failed".to_string(),
                _ => "Operation failed".to_string(),
            }
        }
    }

    /// User-facing message for a failed action, falling back to `fallback`
    /// when the error carries no text of its own.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Self::Auth(m) | Self::Remote(m) | Self::Storage(m)
            | Self::InvalidInput(m) | Self::Config(m)
            | Self::NotFound(m) | Self::PermissionDenied(m)
                if m.trim().is_empty() => fallback.to_string(),
            _ => self.to_safe_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
