//! Expense backend port
//!
//! Defines the interface the submission and list flows use to reach the
//! backend. The HTTP implementation attaches the active session's bearer
//! token; test doubles need not.

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{CreateExpenseRequest, Expense, ExpenseQuery};

/// Expense backend trait
#[async_trait]
pub trait ExpenseGateway: Send + Sync {
    /// Create one expense. The request carries its idempotency key, so a
    /// repeated call with the same request is deduplicated by the backend.
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<Expense>;

    /// Fetch the filtered, sorted collection
    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>>;
}
