//! User domain model

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        full_name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            username: username.into(),
            email: email.into(),
        }
    }
}
