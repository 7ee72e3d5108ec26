//! Backend REST client
//!
//! `ApiClient` is the one place requests leave the process. Every request
//! carries an explicit [`AuthContext`]; every response passes through the
//! [`AuthFailureGuard`] before the caller sees it.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{AuthContext, Route, SessionCell};
use crate::ports::{Navigator, SessionStorage, ACCESS_TOKEN_KEY, USER_KEY};

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "TALLY_API_URL";

/// Error payload shape used by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Success payloads come either wrapped in `{ "data": ... }` or bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(value) => value,
        }
    }
}

/// Global reaction to an unauthorized response.
///
/// Tears down the session (persisted keys and the in-memory session
/// together) and sends the client to login. On login and signup it does
/// nothing: a 401 there means the credentials were refused, and
/// redirecting would loop.
#[derive(Clone)]
pub struct AuthFailureGuard {
    session: SessionCell,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
}

impl AuthFailureGuard {
    pub fn new(
        session: SessionCell,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            storage,
            navigator,
        }
    }

    /// Handle a 401. Returns true when the session was torn down.
    pub fn on_unauthorized(&self) -> bool {
        if self.navigator.current().is_entry() {
            return false;
        }
        // Storage failures must not keep a dead session alive in memory.
        let _ = self.storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY]);
        self.session.clear();
        self.navigator.redirect(Route::Login);
        true
    }
}

/// HTTP client wrapper for the expense backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    guard: AuthFailureGuard,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration, guard: AuthFailureGuard) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        url::Url::parse(trimmed)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
            guard,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B, auth: &AuthContext) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.execute(request, auth).await?;
        Self::decode(response).await
    }

    /// POST with no body, ignoring any response payload
    pub async fn post_empty(&self, path: &str, auth: &AuthContext) -> Result<()> {
        let request = self.client.post(self.url(path));
        self.execute(request, auth).await?;
        Ok(())
    }

    /// GET with query pairs and decode the JSON response
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth: &AuthContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.execute(request, auth).await?;
        Self::decode(response).await
    }

    /// Attach auth, send, and classify the response status
    async fn execute(&self, request: RequestBuilder, auth: &AuthContext) -> Result<Response> {
        let request = match auth.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && self.guard.on_unauthorized() {
            return Err(Error::Authentication);
        }
        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty());

        Err(Error::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(map_request_error)?;
        let payload: Payload<T> = serde_json::from_slice(&bytes)
            .map_err(|e| Error::network(format!("Unexpected response from server: {}", e)))?;
        Ok(payload.into_inner())
    }
}

/// Map request errors to user-friendly messages
fn map_request_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::network("Request timed out")
    } else if error.is_connect() {
        Error::network("Unable to connect to the server")
    } else {
        Error::network(format!("Request failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockApiServer, MockRoute};
    use crate::adapters::{MemoryNavigator, MemorySessionStorage};
    use crate::domain::{Session, User};

    struct Fixture {
        session: SessionCell,
        storage: Arc<MemorySessionStorage>,
        navigator: Arc<MemoryNavigator>,
        client: ApiClient,
    }

    fn fixture(server: &MockApiServer, route: Route) -> Fixture {
        let session = SessionCell::new();
        let storage = Arc::new(MemorySessionStorage::new());
        let navigator = Arc::new(MemoryNavigator::new(route));
        let guard = AuthFailureGuard::new(session.clone(), storage.clone(), navigator.clone());
        let client = ApiClient::new(&server.base_url(), Duration::from_secs(5), guard).unwrap();
        Fixture {
            session,
            storage,
            navigator,
            client,
        }
    }

    fn signed_in(f: &Fixture) {
        f.session
            .replace(Session::new(User::new("u1", "Asha Rao", "asha", "a@x.io"), "tok-1"));
        f.storage
            .set_many(&[(USER_KEY, "{}"), (ACCESS_TOKEN_KEY, "tok-1")])
            .unwrap();
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let guard = AuthFailureGuard::new(
            SessionCell::new(),
            Arc::new(MemorySessionStorage::new()),
            Arc::new(MemoryNavigator::default()),
        );
        let client =
            ApiClient::new("http://localhost:3000/api/v1/", Duration::from_secs(1), guard).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api/v1");
        assert_eq!(client.url("/expenses"), "http://localhost:3000/api/v1/expenses");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let guard = AuthFailureGuard::new(
            SessionCell::new(),
            Arc::new(MemorySessionStorage::new()),
            Arc::new(MemoryNavigator::default()),
        );
        let result = ApiClient::new("not a url", Duration::from_secs(1), guard);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockApiServer::start(vec![MockRoute::json("GET", "/expenses", 200, "[]")]).unwrap();
        let f = fixture(&server, Route::Home);

        let _: Vec<serde_json::Value> = f
            .client
            .get_json("/expenses", &[], &AuthContext::Bearer("tok-9".to_string()))
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("authorization"), Some("Bearer tok-9"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization() {
        let server = MockApiServer::start(vec![MockRoute::json("GET", "/expenses", 200, "[]")]).unwrap();
        let f = fixture(&server, Route::Home);

        let _: Vec<serde_json::Value> = f
            .client
            .get_json("/expenses", &[], &AuthContext::Anonymous)
            .await
            .unwrap();

        assert_eq!(server.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_unauthorized_tears_down_and_redirects() {
        let server = MockApiServer::start(vec![MockRoute::json(
            "GET",
            "/expenses",
            401,
            r#"{"message": "jwt expired"}"#,
        )])
        .unwrap();
        let f = fixture(&server, Route::Home);
        signed_in(&f);

        let result: Result<Vec<serde_json::Value>> = f
            .client
            .get_json("/expenses", &[], &f.session.auth_context())
            .await;

        assert!(matches!(result, Err(Error::Authentication)));
        assert!(!f.session.is_active());
        assert!(f.storage.is_empty());
        assert_eq!(f.navigator.current(), Route::Login);
        assert_eq!(f.navigator.redirects(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_unauthorized_on_entry_page_does_not_redirect() {
        let server = MockApiServer::start(vec![MockRoute::json(
            "POST",
            "/users/login",
            401,
            r#"{"message": "Invalid user credentials"}"#,
        )])
        .unwrap();
        let f = fixture(&server, Route::Signup);
        signed_in(&f);

        let result: Result<serde_json::Value> = f
            .client
            .post_json("/users/login", &serde_json::json!({}), &AuthContext::Anonymous)
            .await;

        match result {
            Err(Error::Rejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Invalid user credentials"));
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
        assert!(f.session.is_active());
        assert!(f.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_without_message() {
        let server =
            MockApiServer::start(vec![MockRoute::json("POST", "/expenses", 500, "oops")]).unwrap();
        let f = fixture(&server, Route::Home);

        let result: Result<serde_json::Value> = f
            .client
            .post_json("/expenses", &serde_json::json!({}), &AuthContext::Anonymous)
            .await;

        assert!(matches!(
            result,
            Err(Error::Rejected {
                status: 500,
                message: None
            })
        ));
    }

    #[tokio::test]
    async fn test_wrapped_and_bare_payloads() {
        let server = MockApiServer::start(vec![
            MockRoute::json("GET", "/wrapped", 200, r#"{"data": [1, 2]}"#),
            MockRoute::json("GET", "/bare", 200, "[3]"),
        ])
        .unwrap();
        let f = fixture(&server, Route::Home);

        let wrapped: Vec<i32> = f
            .client
            .get_json("/wrapped", &[], &AuthContext::Anonymous)
            .await
            .unwrap();
        let bare: Vec<i32> = f
            .client
            .get_json("/bare", &[], &AuthContext::Anonymous)
            .await
            .unwrap();
        assert_eq!(wrapped, vec![1, 2]);
        assert_eq!(bare, vec![3]);
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockApiServer::start(vec![
            MockRoute::json("GET", "/expenses", 200, "[]").delayed(1500),
        ])
        .unwrap();
        let guard = AuthFailureGuard::new(
            SessionCell::new(),
            Arc::new(MemorySessionStorage::new()),
            Arc::new(MemoryNavigator::default()),
        );
        let client = ApiClient::new(&server.base_url(), Duration::from_millis(200), guard).unwrap();

        let result: Result<Vec<serde_json::Value>> =
            client.get_json("/expenses", &[], &AuthContext::Anonymous).await;

        match result {
            Err(Error::Network(message)) => assert_eq!(message, "Request timed out"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let guard = AuthFailureGuard::new(
            SessionCell::new(),
            Arc::new(MemorySessionStorage::new()),
            Arc::new(MemoryNavigator::default()),
        );
        // Port 9 (discard) on loopback is not expected to be listening
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2), guard).unwrap();

        let result = client.post_empty("/users/logout", &AuthContext::Anonymous).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
