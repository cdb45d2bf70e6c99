use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Short sentence suitable for showing to a user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "Could not reach the weather service. Check your connection.",
            ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
                "That city is not known to the weather service."
            }
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN =>
            {
                "You are not signed in, or your session has expired."
            }
            ApiError::Status { .. } => "The weather service returned an error.",
            ApiError::Malformed(_) => "The weather service sent data this client cannot read.",
            ApiError::InvalidUrl(_) => "The API address in your configuration is not valid.",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Failures obtaining a bearer credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("no access token is available for this session")]
    Missing,

    #[error("access token was rejected: {0}")]
    Rejected(String),
}
