//! Durable client-side storage port
//!
//! A small string key/value store, the shape of browser local storage.
//! The session store keeps the user profile and access token under
//! fixed keys and always writes or clears them together.

use crate::domain::result::Result;

/// Key holding the JSON-encoded user profile
pub const USER_KEY: &str = "user";

/// Key holding the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

pub trait SessionStorage: Send + Sync {
    /// Read several entries from one snapshot, in the order of `keys`
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_many(&[key])?.pop().flatten())
    }

    /// Write several entries in one step
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several entries in one step
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}
