//! Entity types of the clubhouse API.
//!
//! Only the identifier and a handful of commonly displayed fields are typed.
//! Everything else the server sends is kept in `extra` and written back
//! unchanged, so the client never drops data it does not understand.
//! Monetary amounts stay JSON numbers to avoid float rounding on the way back.

use clubhouse_core::{
    AccountId, AttendanceId, CategoryId, EventId, FeeId, ItemId, LoanId, MemberId, PostId,
    ProgressId, TransactionId, UnitId, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::resource::Resource;

macro_rules! impl_resource {
    ($ty:ty, $id:ty, $collection:expr, $name:expr) => {
        impl Resource for $ty {
            const COLLECTION: &'static str = $collection;
            const NAME: &'static str = $name;
            type Id = $id;

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

/// A login account (managed from the users view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<UnitId>,
    /// ISO date as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    /// "First Last", falling back to whichever part is present.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
            (None, None) => None,
        }
    }
}

/// A group of members with their leaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<UnitId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One member's attendance at one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A finance account. The balance is computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Income or expense.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipFee {
    pub id: FeeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An inventory item lent to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaned_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Loan {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_resource!(UserAccount, UserId, "/users", "user");
impl_resource!(Member, MemberId, "/members", "member");
impl_resource!(Unit, UnitId, "/units", "unit");
impl_resource!(Event, EventId, "/events", "event");
impl_resource!(Attendance, AttendanceId, "/attendance", "attendance");
impl_resource!(Transaction, TransactionId, "/transactions", "transaction");
impl_resource!(Account, AccountId, "/accounts", "account");
impl_resource!(Category, CategoryId, "/categories", "category");
impl_resource!(MembershipFee, FeeId, "/fees", "fee");
impl_resource!(InventoryItem, ItemId, "/inventory", "inventory item");
impl_resource!(Loan, LoanId, "/loans", "loan");
impl_resource!(ProgressRecord, ProgressId, "/progress", "progress record");
impl_resource!(FeedPost, PostId, "/feed", "post");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_reserialization() {
        let raw = json!({
            "id": "7f9c",
            "first_name": "Ada",
            "unit_id": 3,
            "guardian": {"name": "Byron", "phone": "555"},
            "tags": ["camp"]
        });
        let member: Member = serde_json::from_value(raw.clone()).expect("member");
        assert_eq!(member.id.to_string(), "7f9c");
        assert_eq!(member.unit_id, Some(UnitId::from(3)));
        assert_eq!(serde_json::to_value(&member).expect("serialize"), raw);
    }

    #[test]
    fn amounts_keep_their_json_form() {
        let raw = json!({"id": 12, "amount": 12.5, "date": "2024-03-01", "reference": "R-1"});
        let tx: Transaction = serde_json::from_value(raw.clone()).expect("transaction");
        assert_eq!(tx.amount.as_ref().and_then(Number::as_f64), Some(12.5));
        assert_eq!(serde_json::to_value(&tx).expect("serialize"), raw);
    }

    #[test]
    fn category_type_field_maps_to_kind() {
        let category: Category =
            serde_json::from_value(json!({"id": 1, "name": "Dues", "type": "income"}))
                .expect("category");
        assert_eq!(category.kind.as_deref(), Some("income"));
        assert!(category.extra.is_empty());
    }

    #[test]
    fn item_paths() {
        assert_eq!(Member::item_path(&MemberId::from(4)), "/members/4");
        assert_eq!(MembershipFee::item_path(&FeeId::from("f-9")), "/fees/f-9");
    }

    #[test]
    fn member_full_name() {
        let member: Member =
            serde_json::from_value(json!({"id": 1, "last_name": "Lovelace"})).expect("member");
        assert_eq!(member.full_name().as_deref(), Some("Lovelace"));
    }

    #[test]
    fn open_loans() {
        let loan: Loan = serde_json::from_value(json!({"id": 1, "item_id": 2})).expect("loan");
        assert!(loan.is_open());
    }
}
