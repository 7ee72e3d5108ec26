//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The flows
//! depend only on these traits, not on concrete implementations.

mod expense_gateway;
mod navigator;
mod storage;

pub use expense_gateway::ExpenseGateway;
pub use navigator::Navigator;
pub use storage::{SessionStorage, ACCESS_TOKEN_KEY, USER_KEY};
