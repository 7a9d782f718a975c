//! Strongly-typed ID types for server-assigned entity identifiers.
//!
//! The remote API hands out identifiers as either JSON numbers or JSON
//! strings depending on the entity. The client never generates IDs; it only
//! carries them back to the server, so each ID keeps the exact JSON form it
//! arrived in.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An identifier as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Numeric identifier (e.g. an auto-increment primary key). Kept as a
    /// JSON number so unsigned and fractional forms survive.
    Number(Number),
    /// Opaque string identifier (e.g. a UUID).
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for RawId {
    type Err = Infallible;

    /// Input in canonical integer form becomes a numeric ID. Anything else,
    /// including `007` or `+7`, is kept as text exactly as given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = s
            .parse::<i64>()
            .map(Number::from)
            .or_else(|_| s.parse::<u64>().map(Number::from))
            .ok()
            .filter(|n| n.to_string() == s);
        Ok(canonical.map_or_else(|| Self::Text(s.to_string()), Self::Number))
    }
}

/// Macro to generate a strongly-typed ID wrapper around [`RawId`].
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(RawId);

        impl $name {
            /// Wraps a wire identifier.
            #[must_use]
            pub const fn from_raw(raw: RawId) -> Self {
                Self(raw)
            }

            /// Returns the wire identifier.
            #[must_use]
            pub const fn as_raw(&self) -> &RawId {
                &self.0
            }

            /// Returns the entity kind used in log and error messages.
            #[must_use]
            pub const fn kind() -> &'static str {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                RawId::from_str(s).map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                Self(RawId::Number(Number::from(n)))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(RawId::Text(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(RawId::Text(s.to_string()))
            }
        }

        impl From<$name> for RawId {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a login account.
    UserId,
    "user"
);

define_id!(
    /// Identifier of a club member.
    MemberId,
    "member"
);

define_id!(
    /// Identifier of a unit (section, patrol, group).
    UnitId,
    "unit"
);

define_id!(
    /// Identifier of a scheduled event.
    EventId,
    "event"
);

define_id!(
    /// Identifier of an attendance record.
    AttendanceId,
    "attendance"
);

define_id!(
    /// Identifier of a financial transaction.
    TransactionId,
    "transaction"
);

define_id!(
    /// Identifier of a financial account.
    AccountId,
    "account"
);

define_id!(
    /// Identifier of a transaction category.
    CategoryId,
    "category"
);

define_id!(
    /// Identifier of a membership fee.
    FeeId,
    "fee"
);

define_id!(
    /// Identifier of an inventory item.
    ItemId,
    "item"
);

define_id!(
    /// Identifier of an inventory loan.
    LoanId,
    "loan"
);

define_id!(
    /// Identifier of a progress record.
    ProgressId,
    "progress"
);

define_id!(
    /// Identifier of a feed post.
    PostId,
    "post"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_keeps_number_form() {
        let id: UserId = serde_json::from_str("42").expect("deserialize");
        assert_eq!(id, UserId::from(42));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
    }

    #[test]
    fn text_id_keeps_string_form() {
        let id: MemberId = serde_json::from_str("\"3f1c-aa\"").expect("deserialize");
        assert_eq!(id, MemberId::from("3f1c-aa"));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"3f1c-aa\"");
    }

    #[test]
    fn display_has_no_decoration() {
        assert_eq!(EventId::from(7).to_string(), "7");
        assert_eq!(EventId::from("evt-1").to_string(), "evt-1");
    }

    #[test]
    fn parse_digits_as_number() {
        let id: LoanId = "123".parse().expect("infallible");
        assert_eq!(id.as_raw(), &RawId::Number(Number::from(123)));
        assert_eq!(id, LoanId::from(123));
    }

    #[test]
    fn parse_keeps_non_canonical_digits_as_text() {
        let id: MemberId = "007".parse().expect("infallible");
        assert_eq!(id.as_raw(), &RawId::Text("007".to_string()));
        assert_eq!(id.to_string(), "007");

        let id: MemberId = "+7".parse().expect("infallible");
        assert_eq!(id.to_string(), "+7");
    }

    #[test]
    fn large_unsigned_and_fractional_ids_round_trip() {
        let big: UserId = serde_json::from_str("18446744073709551615").expect("u64 id");
        assert_eq!(big.to_string(), "18446744073709551615");
        assert_eq!(
            serde_json::to_string(&big).expect("serialize"),
            "18446744073709551615"
        );

        let parsed: UserId = "18446744073709551615".parse().expect("infallible");
        assert_eq!(parsed, big);

        let fractional: UnitId = serde_json::from_str("1.0").expect("float id");
        assert_eq!(serde_json::to_string(&fractional).expect("serialize"), "1.0");
    }

    #[test]
    fn parse_other_as_text() {
        let id: LoanId = "abc-123".parse().expect("infallible");
        assert_eq!(id.as_raw(), &RawId::Text("abc-123".to_string()));
    }

    #[test]
    fn number_and_text_forms_differ() {
        assert_ne!(UnitId::from(1), UnitId::from("1"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(UserId::kind(), "user");
        assert_eq!(PostId::kind(), "post");
    }
}
