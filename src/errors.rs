/*!
 * Error types for the backtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a model backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Backend call exceeded the configured deadline
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
}

/// Errors that can occur while running the consensus pipeline
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required request field is missing or empty; rejected before any backend call
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Every configured model failed its round trip
    #[error("All translation models failed: {0}")]
    AllModelsFailed(String),

    /// The caller aborted the request
    #[error("Translation cancelled")]
    Cancelled,

    /// A ranking or scoring invariant was violated; indicates a programming defect
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a model backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the consensus engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
