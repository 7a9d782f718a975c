//! Error types for the access crate.
//!
//! `AuthenticationError` is what a failed login reports. Its `Display` text
//! is written for the login screen. Guard denials are not errors; see
//! [`GuardDecision`](crate::guard::GuardDecision).

use clubhouse_core::UNREACHABLE_MESSAGE;
use std::fmt;

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The server rejected the login. `message` comes from the response body.
    Rejected { status: u16, message: String },
    /// A successful response carried no usable access token.
    MissingToken,
    /// A successful response carried no usable user object.
    MissingUser { reason: String },
    /// The response body could not be read.
    InvalidResponse { reason: String },
    /// The server could not be reached.
    Unreachable,
    /// Credentials could not be written to durable storage.
    Storage { reason: String },
    /// The session changed while the login was in flight.
    Superseded,
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { message, .. } => f.write_str(message),
            Self::MissingToken => {
                write!(f, "login failed: the server did not return an access token")
            }
            Self::MissingUser { reason } => {
                write!(f, "login failed: the server did not return a user profile ({reason})")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "login failed: unreadable server response ({reason})")
            }
            Self::Unreachable => f.write_str(UNREACHABLE_MESSAGE),
            Self::Storage { reason } => {
                write!(f, "login failed: could not save credentials ({reason})")
            }
            Self::Superseded => {
                write!(f, "login discarded: the session changed while signing in")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}
