use desk_core::error::CoreError;
use reqwest::StatusCode;
use thiserror::Error;

/// Local input problems. Never leave the process and never touch state.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please select a file first")]
    NoFile,

    #[error("You can only upload one file at a time.")]
    MultipleFiles,

    #[error("Only PDF files are allowed")]
    NotPdf { content_type: String },

    #[error("File is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No authentication token found. Please log in.")]
    MissingCredential,

    #[error("Unauthorized: the backend rejected the credential")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(ValidationError::Invalid(err))
    }
}

impl ClientError {
    /// Text shown to the user for this error.
    ///
    /// Server `detail` is shown verbatim; transport and decode failures fall
    /// back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ClientError::Validation(err) => err.to_string(),
            ClientError::MissingCredential => self.to_string(),
            ClientError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Errors that end the session rather than the single call.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::MissingCredential | ClientError::Unauthorized
        )
    }
}
