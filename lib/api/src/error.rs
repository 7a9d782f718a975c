//! Request layer error types.

use clubhouse_core::UNREACHABLE_MESSAGE;
use std::fmt;

/// Errors from API requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached (connection refused, DNS, timeout).
    Unreachable { url: String, reason: String },
    /// The server answered with a non-2xx status.
    ///
    /// `message` is derived from the response body.
    Http { status: u16, message: String },
    /// A 2xx body could not be decoded into the expected type.
    Decode { url: String, reason: String },
    /// A request body could not be serialized.
    Encode { reason: String },
    /// The HTTP client could not be constructed.
    Client { reason: String },
}

impl ApiError {
    /// Returns the HTTP status, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable { .. } => UNREACHABLE_MESSAGE.to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::Decode { .. } => {
                "The server sent a response the client could not read.".to_string()
            }
            Self::Encode { .. } | Self::Client { .. } => {
                "The request could not be sent.".to_string()
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { url, reason } => {
                write!(f, "cannot reach server at '{url}': {reason}")
            }
            Self::Http { status, message } => {
                write!(f, "request failed with HTTP {status}: {message}")
            }
            Self::Decode { url, reason } => {
                write!(f, "failed to decode response from '{url}': {reason}")
            }
            Self::Encode { reason } => {
                write!(f, "failed to encode request body: {reason}")
            }
            Self::Client { reason } => {
                write!(f, "invalid HTTP client or request: {reason}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
