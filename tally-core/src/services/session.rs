//! Session store - login, registration, logout and restore
//!
//! Holds the active session for one client instance. The in-memory
//! session lives in a [`SessionCell`] shared with the HTTP layer, and the
//! durable copy lives in [`SessionStorage`] under fixed keys. Both are
//! written and cleared together.

use std::sync::Arc;

use crate::adapters::ApiClient;
use crate::domain::result::{Error, OperationResult, Result};
use crate::domain::{
    AuthContext, LoginIdentifier, LoginPayload, LoginRequest, RegistrationProfile, Session,
    SessionCell, User,
};
use crate::ports::{SessionStorage, ACCESS_TOKEN_KEY, USER_KEY};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Session store service
pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn SessionStorage>,
    session: SessionCell,
}

impl SessionStore {
    pub fn new(client: ApiClient, storage: Arc<dyn SessionStorage>, session: SessionCell) -> Self {
        Self {
            client,
            storage,
            session,
        }
    }

    /// Reinstate the persisted session, if there is a complete one.
    ///
    /// A half-written or unreadable session (user without token, token
    /// without user, malformed profile) is cleared from storage and the
    /// client starts signed out.
    pub fn restore(&self) -> Result<Option<Session>> {
        let mut snapshot = self.storage.get_many(&[USER_KEY, ACCESS_TOKEN_KEY])?.into_iter();
        let user = snapshot.next().flatten();
        let token = snapshot.next().flatten();

        let restored = match (user, token) {
            (Some(user_json), Some(token)) if !token.is_empty() => {
                serde_json::from_str::<User>(&user_json)
                    .ok()
                    .map(|user| Session::new(user, token))
            }
            (None, None) => {
                self.session.clear();
                return Ok(None);
            }
            _ => None,
        };

        match restored {
            Some(session) => {
                self.session.replace(session.clone());
                Ok(Some(session))
            }
            None => {
                self.storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY])?;
                self.session.clear();
                Ok(None)
            }
        }
    }

    /// Log in with an email or username.
    ///
    /// On success the session is persisted, then made active. On any
    /// failure the current session (if any) is left untouched.
    pub async fn login(&self, identifier: &LoginIdentifier, password: &str) -> OperationResult<User> {
        if password.is_empty() {
            return OperationResult::fail("Password is required");
        }

        let request = LoginRequest::new(identifier, password);
        let result = self
            .client
            .post_json::<_, LoginPayload>("/users/login", &request, &AuthContext::Anonymous)
            .await
            .and_then(|payload| self.establish(Session::from(payload)));

        OperationResult::from_result(result, LOGIN_FAILED)
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, profile: &RegistrationProfile) -> OperationResult<()> {
        if let Err(e) = profile.validate() {
            return OperationResult::fail(e.user_message(REGISTRATION_FAILED));
        }

        let result = self
            .client
            .post_json::<_, serde_json::Value>("/users/register", profile, &AuthContext::Anonymous)
            .await
            .map(|_| ());

        OperationResult::from_result(result, REGISTRATION_FAILED)
    }

    /// Best-effort remote logout, guaranteed local logout.
    ///
    /// The server call may fail for any reason; the local session is
    /// cleared regardless. Only a failure to clear local storage is
    /// reported.
    pub async fn logout(&self) -> Result<()> {
        let auth = self.session.auth_context();
        if auth.bearer_token().is_some() {
            // Remote failure is ignored; local logout always proceeds.
            let _ = self.client.post_empty("/users/logout", &auth).await;
        }

        self.session.clear();
        self.storage.remove_many(&[USER_KEY, ACCESS_TOKEN_KEY])
    }

    pub fn current(&self) -> Option<Session> {
        self.session.snapshot()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.snapshot().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    /// Shared handle to the active session
    pub fn session(&self) -> &SessionCell {
        &self.session
    }

    fn establish(&self, session: Session) -> Result<User> {
        let user_json = serde_json::to_string(&session.user)?;
        self.storage
            .set_many(&[(USER_KEY, &user_json), (ACCESS_TOKEN_KEY, &session.access_token)])
            .map_err(|e| Error::storage(format!("Failed to save session: {}", e)))?;
        let user = session.user.clone();
        self.session.replace(session);
        Ok(user)
    }
}
