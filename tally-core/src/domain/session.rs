//! Session and credential models

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::User;

/// An authenticated session.
///
/// User and access token live in one value so they can only be set or
/// cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

/// Shared handle to the active session of one client instance.
///
/// Readers get a snapshot; writers replace or clear the whole session
/// under one lock, so no reader ever sees a user without a token.
#[derive(Debug, Clone, Default)]
pub struct SessionCell {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, session: Session) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(poisoned) => *poisoned.into_inner() = Some(session),
        }
    }

    /// Clear the session, returning what was there
    pub fn clear(&self) -> Option<Session> {
        match self.inner.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Authorization for the next request
    pub fn auth_context(&self) -> AuthContext {
        AuthContext::from_session(self.snapshot().as_ref())
    }
}

/// Authorization attached to a single outbound request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    Bearer(String),
    #[default]
    Anonymous,
}

impl AuthContext {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self::Bearer(session.access_token.clone()),
            None => Self::Anonymous,
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) => Some(token),
            Self::Anonymous => None,
        }
    }
}

/// How the user identifies themselves at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Username(String),
}

impl LoginIdentifier {
    /// Pick an identifier from optional email/username inputs.
    ///
    /// Email wins when both are given. Blank values count as absent.
    pub fn from_parts(email: Option<String>, username: Option<String>) -> Result<Self> {
        let email = email.filter(|e| !e.trim().is_empty());
        let username = username.filter(|u| !u.trim().is_empty());
        match (email, username) {
            (Some(email), _) => Ok(Self::Email(email.trim().to_string())),
            (None, Some(username)) => Ok(Self::Username(username.trim().to_string())),
            (None, None) => Err(Error::validation("Email or username is required")),
        }
    }
}

/// Body of `POST /users/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
}

impl LoginRequest {
    pub fn new(identifier: &LoginIdentifier, password: impl Into<String>) -> Self {
        let (email, username) = match identifier {
            LoginIdentifier::Email(email) => (Some(email.clone()), None),
            LoginIdentifier::Username(username) => (None, Some(username.clone())),
        };
        Self {
            email,
            username,
            password: password.into(),
        }
    }
}

/// `data` payload of a successful login response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl From<LoginPayload> for Session {
    fn from(payload: LoginPayload) -> Self {
        Self {
            user: payload.user,
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        }
    }
}

/// Body of `POST /users/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationProfile {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationProfile {
    /// Every field is required
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("Full name", &self.full_name),
            ("Username", &self.username),
            ("Email", &self.email),
            ("Password", &self.password),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{label} is required")));
            }
        }
        Ok(())
    }
}
