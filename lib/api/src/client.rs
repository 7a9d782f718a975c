//! HTTP client for the clubhouse REST API.

use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::message::error_message;
use crate::token::TokenSlot;

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Attach the current token, if one is set.
    Authenticated,
    /// Never attach a token (e.g. the login call itself).
    Public,
}

/// Token-aware JSON client.
///
/// Cloning is cheap; clones share the connection pool and the token slot.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenSlot>,
}

impl ApiClient {
    /// Creates a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(TokenSlot::new()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the shared token slot.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenSlot> {
        &self.tokens
    }

    /// Returns the token currently attached to authenticated requests.
    pub async fn token(&self) -> Option<String> {
        self.tokens.token().await
    }

    /// Returns the current token generation.
    pub async fn generation(&self) -> u64 {
        self.tokens.generation().await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends a request and returns the decoded JSON body.
    ///
    /// A 204 or an empty 2xx body yields `None`. Non-2xx responses become
    /// [`ApiError::Http`]; a 401 on a request that carried a token also
    /// removes that token from the slot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unreachable`] on transport failure,
    /// [`ApiError::Http`] on non-2xx status and [`ApiError::Decode`] if a
    /// 2xx body is not JSON.
    #[instrument(skip(self, query, body))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        access: Access,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.url(path);
        let (token, generation) = match access {
            Access::Authenticated => self.tokens.current().await,
            Access::Public => (None, 0),
        };

        let mut request = self
            .http
            .request(method, &url)
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                return ApiError::Client {
                    reason: e.to_string(),
                };
            }
            warn!(url = %url, error = %e, "request did not reach the server");
            ApiError::Unreachable {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ApiError::Unreachable {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        debug!(status = status.as_u16(), len = bytes.len(), "response received");

        if status.is_success() {
            if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            return serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ApiError::Decode {
                    url,
                    reason: e.to_string(),
                });
        }

        let error_body: Option<Value> = serde_json::from_slice(&bytes).ok();
        let message = error_message(status.as_u16(), error_body.as_ref());

        if status == StatusCode::UNAUTHORIZED
            && token.is_some()
            && self.tokens.revoke(generation).await
        {
            warn!(url = %url, "server rejected the bearer token; token cleared");
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self
            .send(method, path, query, body, Access::Authenticated)
            .await?;
        serde_json::from_value(value.unwrap_or(Value::Null)).map_err(|e| ApiError::Decode {
            url: self.url(path),
            reason: e.to_string(),
        })
    }

    fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body).map_err(|e| ApiError::Encode {
            reason: e.to_string(),
        })
    }

    /// Authenticated GET.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_typed(Method::GET, path, &[], None).await
    }

    /// Authenticated GET with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.send_typed(Method::GET, path, query, None).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Self::encode(body)?;
        self.send_typed(Method::POST, path, &[], Some(&body)).await
    }

    /// Authenticated PUT with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = Self::encode(body)?;
        self.send_typed(Method::PUT, path, &[], Some(&body)).await
    }

    /// Authenticated DELETE. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, &[], None, Access::Authenticated)
            .await
            .map(|_| ())
    }

    /// POST without the bearer token. Used for the login call.
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let body = Self::encode(body)?;
        self.send(Method::POST, path, &[], Some(&body), Access::Public)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhouse_core::UNREACHABLE_MESSAGE;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ApiConfig::new(server.uri())).expect("client")
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members"))
            .and(header("authorization", "Bearer tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("tok1").await;
        let members: Value = client.get("/members").await.expect("get");
        assert_eq!(members, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!([]))
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server);
        let feed: Value = client.get("/feed").await.expect("get");
        assert_eq!(feed, json!([]));
    }

    #[tokio::test]
    async fn public_requests_never_carry_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.com"})))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("old").await;
        let body = client
            .post_public("/auth/login", &json!({"email": "a@b.com"}))
            .await
            .expect("post");
        assert_eq!(body, Some(json!({"ok": true})));
    }

    #[tokio::test]
    async fn no_content_is_empty_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/units/4"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/units/4"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.delete("/units/4").await.expect("delete");
        let updated: Option<Value> = client
            .put("/units/4", &json!({"name": "Otters"}))
            .await
            .expect("put");
        assert_eq!(updated, None);
    }

    #[tokio::test]
    async fn query_parameters_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("unit_id", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _: Value = client
            .get_with_query("/events", &[("unit_id", "3")])
            .await
            .expect("get");
    }

    #[tokio::test]
    async fn error_body_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/members"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"errors": {"email": "is invalid"}, "message": "x"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .post::<_, Value>("/members", &json!({"email": "nope"}))
            .await
            .expect_err("422");
        assert_eq!(
            err,
            ApiError::Http {
                status: 422,
                message: "email: is invalid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("/accounts").await.expect_err("502");
        assert_eq!(err.user_message(), "HTTP 502");
    }

    #[tokio::test]
    async fn unauthorized_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let generation = client.tokens().install("tok1").await;
        let err = client.get::<Value>("/members").await.expect_err("401");

        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Token expired");
        assert_eq!(client.token().await, None);
        assert!(client.generation().await > generation);
    }

    #[tokio::test]
    async fn forbidden_keeps_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().install("tok1").await;
        let err = client.get::<Value>("/finance").await.expect_err("403");
        assert_eq!(err.status(), Some(403));
        assert_eq!(client.token().await.as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn unreachable_server_is_distinct() {
        // Port 1 is reserved and refuses connections.
        let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:1")).expect("client");
        let err = client.get::<Value>("/members").await.expect_err("unreachable");
        assert!(err.is_unreachable());
        assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn invalid_json_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/units"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>("/units").await.expect_err("decode");
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn url_joining() {
        let client = ApiClient::new(&ApiConfig::new("http://api.example.org/v1/")).expect("client");
        assert_eq!(client.base_url(), "http://api.example.org/v1");
        assert_eq!(client.url("/members"), "http://api.example.org/v1/members");
        assert_eq!(client.url("members"), "http://api.example.org/v1/members");
    }
}
