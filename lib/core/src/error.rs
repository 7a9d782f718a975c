//! Error handling foundation for the clubhouse client.
//!
//! Library crates define their own domain error enums. Application
//! boundaries wrap them in rootcause reports through this alias.

use rootcause::Report;

/// User-facing message for transport failures (server unreachable).
///
/// Kept distinct from HTTP error text so the UI can tell "the server said
/// no" apart from "the server never answered".
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot reach the server. Check your connection and try again.";

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_defaults_to_unit_context() {
        let ok: Result<u16> = Ok(204);
        assert_eq!(ok.expect("should be ok"), 204);
    }

    #[test]
    fn unreachable_message_does_not_mention_status() {
        assert!(!UNREACHABLE_MESSAGE.contains("HTTP"));
    }
}
