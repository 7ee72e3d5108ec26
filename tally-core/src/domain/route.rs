//! Client routes the navigator can be on

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Signup,
    Home,
}

impl Route {
    /// Unauthenticated entry pages. A 401 seen here is a rejected
    /// credential, not an expired session.
    pub fn is_entry(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Signup => "signup",
            Route::Home => "home",
        }
    }
}
