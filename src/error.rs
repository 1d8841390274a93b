//! Error taxonomy for content retrieval, audio playback and platform capabilities
//!
//! None of these are fatal: every failure is reported to the user and the
//! application keeps running in a degraded state.

use thiserror::Error;

/// Failure while retrieving chapter lists, verse text or translations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("content server responded with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Network(_) => {
                "Connection error. Check your internet connection and try again.".to_string()
            }
            FetchError::Status(404) => "The requested chapter or translation was not found.".to_string(),
            FetchError::Status(429) => "Rate limited by the content server. Please wait a moment.".to_string(),
            FetchError::Status(code) if *code >= 500 => {
                "The content server is having trouble right now. Try again later.".to_string()
            }
            FetchError::Status(code) => format!("Content request failed (HTTP {code})."),
            FetchError::Decode(_) | FetchError::Malformed(_) => {
                "Received an unexpected response format from the server.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Failure to load, decode or output an audio resource
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("could not retrieve audio: {0}")]
    Source(String),

    #[error("could not decode audio: {0}")]
    Decode(String),

    #[error("audio output failed: {0}")]
    Output(String),
}

/// A hardware capability was refused by the platform
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("audio output unavailable: {0}")]
    AudioOutputDenied(String),
}
