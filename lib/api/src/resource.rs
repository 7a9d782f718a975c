//! Typed access to the API's entity collections.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::client::ApiClient;
use crate::error::ApiError;

/// An entity stored in a REST collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path, e.g. `/members`.
    const COLLECTION: &'static str;

    /// Singular name used in logs.
    const NAME: &'static str;

    /// Identifier type. Parsing from text accepts what `Display` produces.
    type Id: fmt::Display + FromStr + Clone + PartialEq + Send + Sync;

    fn id(&self) -> &Self::Id;

    /// Path of a single item in the collection.
    fn item_path(id: &Self::Id) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

/// List responses arrive either bare or wrapped in `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<R> {
    Bare(Vec<R>),
    Enveloped { data: Vec<R> },
}

impl<R> ListBody<R> {
    fn into_items(self) -> Vec<R> {
        match self {
            Self::Bare(items) | Self::Enveloped { data: items } => items,
        }
    }
}

/// CRUD operations for one resource type.
pub struct ResourceClient<'a, R> {
    client: &'a ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<'a, R: Resource> ResourceClient<'a, R> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    #[instrument(skip(self, query), fields(resource = R::NAME))]
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<R>, ApiError> {
        let body: ListBody<R> = self.client.get_with_query(R::COLLECTION, query).await?;
        let items = body.into_items();
        debug!(count = items.len(), "listed");
        Ok(items)
    }

    #[instrument(skip(self, id), fields(resource = R::NAME, id = %id))]
    pub async fn get(&self, id: &R::Id) -> Result<R, ApiError> {
        self.client.get(&R::item_path(id)).await
    }

    /// Creates an entity and returns the server's copy.
    #[instrument(skip(self, draft), fields(resource = R::NAME))]
    pub async fn create<B: Serialize + ?Sized>(&self, draft: &B) -> Result<R, ApiError> {
        self.client.post(R::COLLECTION, draft).await
    }

    /// Updates an entity. Returns `None` if the server answered without a body.
    #[instrument(skip(self, id, patch), fields(resource = R::NAME, id = %id))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &R::Id,
        patch: &B,
    ) -> Result<Option<R>, ApiError> {
        self.client.put(&R::item_path(id), patch).await
    }

    #[instrument(skip(self, id), fields(resource = R::NAME, id = %id))]
    pub async fn delete(&self, id: &R::Id) -> Result<(), ApiError> {
        self.client.delete(&R::item_path(id)).await
    }
}

/// Loading, error and item state for one collection view.
///
/// Local items are only patched after the server confirms a mutation.
#[derive(Debug, Clone)]
pub struct ResourceState<R> {
    loading: bool,
    error: Option<String>,
    items: Vec<R>,
}

impl<R> Default for ResourceState<R> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            items: Vec::new(),
        }
    }
}

impl<R: Resource> ResourceState<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Fetches the collection and stores the result.
    ///
    /// Returns false if the session changed while the request was in flight;
    /// the response is then dropped and the state left as it was. A 401 that
    /// revoked the token this request carried is not such a change: its
    /// error is recorded like any other.
    pub async fn load(&mut self, client: &ApiClient, query: &[(&str, &str)]) -> bool {
        self.loading = true;
        let generation = client.generation().await;
        let result = ResourceClient::<R>::new(client).list(query).await;

        let changed = client.generation().await != generation;
        let own_revoke = matches!(&result, Err(e) if e.is_unauthorized())
            && client.tokens().revoked_at(generation).await;
        if changed && !own_revoke {
            debug!(resource = R::NAME, "discarding stale list response");
            self.loading = false;
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        self.loading = false;
        true
    }

    /// Returns the items matching `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Vec<&R>
    where
        F: FnMut(&R) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn apply_created(&mut self, item: R) {
        self.items.push(item);
    }

    /// Replaces the local copy of `item`, appending it if unknown.
    pub fn apply_updated(&mut self, item: R) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn apply_removed(&mut self, id: &R::Id) {
        self.items.retain(|item| item.id() != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::entities::{Member, Unit};
    use clubhouse_core::{MemberId, UnitId};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ApiConfig::new(server.uri())).expect("client")
    }

    #[tokio::test]
    async fn list_accepts_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "Otters"}])),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let units = ResourceClient::<Unit>::new(&client)
            .list(&[])
            .await
            .expect("list");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name.as_deref(), Some("Otters"));
    }

    #[tokio::test]
    async fn list_accepts_data_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"data": [{"id": "u-1"}, {"id": "u-2"}], "total": 2}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let units = ResourceClient::<Unit>::new(&client)
            .list(&[])
            .await
            .expect("list");
        let ids: Vec<String> = units.iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, vec!["u-1", "u-2"]);
    }

    #[tokio::test]
    async fn get_update_and_delete_use_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members/7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 7, "first_name": "Ada"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/members/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/members/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let members = ResourceClient::<Member>::new(&client);
        let id = MemberId::from(7);

        let member = members.get(&id).await.expect("get");
        assert_eq!(member.first_name.as_deref(), Some("Ada"));
        let updated = members
            .update(&id, &json!({"first_name": "Ada L."}))
            .await
            .expect("update");
        assert!(updated.is_none());
        members.delete(&id).await.expect("delete");
    }

    #[tokio::test]
    async fn load_records_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Forbidden"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut state = ResourceState::<Unit>::new();
        assert!(state.load(&client, &[]).await);
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("Forbidden"));
        assert!(state.items().is_empty());
    }

    #[tokio::test]
    async fn load_discards_response_when_session_changes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}]))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("tok1").await;
        let mut state = ResourceState::<Unit>::new();

        let (applied, _) = tokio::join!(state.load(&client, &[]), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.tokens().clear().await
        });

        assert!(!applied);
        assert!(state.items().is_empty());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn load_records_unauthorized_error_and_drops_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("tok1").await;
        let mut state = ResourceState::<Unit>::new();

        assert!(state.load(&client, &[]).await);
        assert_eq!(state.error(), Some("Token expired"));
        assert!(!state.is_loading());
        assert_eq!(client.token().await, None);
    }

    #[tokio::test]
    async fn load_discards_unauthorized_when_session_was_replaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": "Token expired"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("tok1").await;
        let mut state = ResourceState::<Unit>::new();

        let (applied, _) = tokio::join!(state.load(&client, &[]), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.tokens().install("tok2").await
        });

        assert!(!applied);
        assert_eq!(state.error(), None);
        assert_eq!(client.token().await.as_deref(), Some("tok2"));
    }

    #[test]
    fn local_patches_follow_confirmed_mutations() {
        let mut state = ResourceState::<Unit>::new();
        let otters: Unit =
            serde_json::from_value(json!({"id": 1, "name": "Otters"})).expect("unit");
        let badgers: Unit =
            serde_json::from_value(json!({"id": 2, "name": "Badgers"})).expect("unit");
        state.apply_created(otters);
        state.apply_created(badgers);

        let renamed: Unit =
            serde_json::from_value(json!({"id": 1, "name": "Sea Otters"})).expect("unit");
        state.apply_updated(renamed);
        assert_eq!(
            state.find(&UnitId::from(1)).and_then(|u| u.name.as_deref()),
            Some("Sea Otters")
        );

        state.apply_removed(&UnitId::from(2));
        assert_eq!(state.items().len(), 1);
        assert_eq!(
            state
                .filter(|u| u.name.as_deref().is_some_and(|n| n.starts_with("Sea")))
                .len(),
            1
        );
    }
}
