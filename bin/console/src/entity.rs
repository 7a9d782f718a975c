//! Entity commands: collection listing, lookup and deletion.

use clap::ValueEnum;
use clubhouse_api::entities::{
    Account, Attendance, Category, Event, FeedPost, InventoryItem, Loan, Member, MembershipFee,
    ProgressRecord, Transaction, Unit, UserAccount,
};
use clubhouse_api::{ApiClient, Resource, ResourceClient, ResourceState};
use serde_json::Value;

use crate::error::ConsoleError;

/// Entity collections the console can reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Users,
    Members,
    Units,
    Events,
    Attendance,
    Transactions,
    Accounts,
    Categories,
    Fees,
    Inventory,
    Loans,
    Progress,
    Feed,
}

/// Calls a generic function with the resource type matching `$kind`.
macro_rules! dispatch {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Users => $func::<UserAccount>($($arg),*).await,
            EntityKind::Members => $func::<Member>($($arg),*).await,
            EntityKind::Units => $func::<Unit>($($arg),*).await,
            EntityKind::Events => $func::<Event>($($arg),*).await,
            EntityKind::Attendance => $func::<Attendance>($($arg),*).await,
            EntityKind::Transactions => $func::<Transaction>($($arg),*).await,
            EntityKind::Accounts => $func::<Account>($($arg),*).await,
            EntityKind::Categories => $func::<Category>($($arg),*).await,
            EntityKind::Fees => $func::<MembershipFee>($($arg),*).await,
            EntityKind::Inventory => $func::<InventoryItem>($($arg),*).await,
            EntityKind::Loans => $func::<Loan>($($arg),*).await,
            EntityKind::Progress => $func::<ProgressRecord>($($arg),*).await,
            EntityKind::Feed => $func::<FeedPost>($($arg),*).await,
        }
    };
}

impl EntityKind {
    /// The view whose allow-list governs this collection.
    #[must_use]
    pub fn view_path(self) -> &'static str {
        match self {
            Self::Users => "/users",
            Self::Members => "/members",
            Self::Units => "/units",
            Self::Events | Self::Attendance => "/events",
            Self::Transactions | Self::Accounts | Self::Categories | Self::Fees => "/finance",
            Self::Inventory | Self::Loans => "/inventory",
            Self::Progress => "/progress",
            Self::Feed => "/feed",
        }
    }

    pub async fn list(
        self,
        api: &ApiClient,
        query: &[(&str, &str)],
    ) -> Result<Value, ConsoleError> {
        dispatch!(self, list_items(api, query))
    }

    pub async fn get(self, api: &ApiClient, id: &str) -> Result<Value, ConsoleError> {
        dispatch!(self, get_item(api, id))
    }

    pub async fn delete(self, api: &ApiClient, id: &str) -> Result<(), ConsoleError> {
        dispatch!(self, delete_item(api, id))
    }
}

async fn list_items<R: Resource>(
    api: &ApiClient,
    query: &[(&str, &str)],
) -> Result<Value, ConsoleError> {
    let mut state = ResourceState::<R>::new();
    if !state.load(api, query).await {
        return Err(ConsoleError::Stale);
    }
    if let Some(message) = state.error() {
        return Err(ConsoleError::Request {
            message: message.to_string(),
        });
    }
    to_json(state.items())
}

async fn get_item<R: Resource>(api: &ApiClient, id: &str) -> Result<Value, ConsoleError> {
    let id = parse_id::<R>(id)?;
    let item = ResourceClient::<R>::new(api).get(&id).await?;
    to_json(&item)
}

async fn delete_item<R: Resource>(api: &ApiClient, id: &str) -> Result<(), ConsoleError> {
    let id = parse_id::<R>(id)?;
    ResourceClient::<R>::new(api).delete(&id).await?;
    Ok(())
}

fn parse_id<R: Resource>(id: &str) -> Result<R::Id, ConsoleError> {
    id.parse().map_err(|_| ConsoleError::Request {
        message: format!("'{id}' is not a valid {} id", R::NAME),
    })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, ConsoleError> {
    serde_json::to_value(value).map_err(|e| ConsoleError::Output {
        details: e.to_string(),
    })
}
