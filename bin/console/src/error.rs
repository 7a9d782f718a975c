//! Errors reported by console commands.

use clubhouse_api::ApiError;
use std::fmt;

#[derive(Debug)]
pub enum ConsoleError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The HTTP client could not be built.
    Client { details: String },
    /// Login failed. `message` is what the login screen would show.
    Login { message: String },
    /// A request failed.
    Request { message: String },
    /// The route guard refused the current session.
    Denied { path: String, redirect: String },
    /// The session changed while a request was in flight.
    Stale,
    /// The result could not be printed.
    Output { details: String },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Client { details } => write!(f, "cannot create API client: {details}"),
            Self::Login { message } => f.write_str(message),
            Self::Request { message } => f.write_str(message),
            Self::Denied { path, redirect } => {
                write!(f, "access to '{path}' denied (redirect to '{redirect}')")
            }
            Self::Stale => write!(f, "the session changed while the request was running"),
            Self::Output { details } => write!(f, "cannot format output: {details}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

impl From<ApiError> for ConsoleError {
    fn from(err: ApiError) -> Self {
        Self::Request {
            message: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhouse_core::UNREACHABLE_MESSAGE;

    #[test]
    fn request_errors_use_user_message() {
        let err = ConsoleError::from(ApiError::Unreachable {
            url: "http://127.0.0.1:1/members".to_string(),
            reason: "connection refused".to_string(),
        });
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
    }

    #[test]
    fn denied_names_path_and_redirect() {
        let err = ConsoleError::Denied {
            path: "/finance".to_string(),
            redirect: "/".to_string(),
        };
        assert_eq!(err.to_string(), "access to '/finance' denied (redirect to '/')");
    }
}
