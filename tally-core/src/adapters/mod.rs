//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the backend REST API (plus the global
//!   unauthorized-response guard)
//! - JSON file and in-memory session storage
//! - In-process navigator

pub mod expenses;
pub mod http;
pub mod navigator;
pub mod storage;

#[cfg(test)]
pub mod mock_server;

pub use expenses::HttpExpenseGateway;
pub use http::{ApiClient, AuthFailureGuard};
pub use navigator::MemoryNavigator;
pub use storage::{FileSessionStorage, MemorySessionStorage};
