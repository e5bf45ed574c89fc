use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Checkout(String),

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Response contained no data")]
    MissingData,

    #[error("Storage error")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message the server attached to a rejected call, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
