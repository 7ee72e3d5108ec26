//! Core domain entities
//!
//! All client-side entities are defined here. These are pure data
//! structures with validation logic - no I/O or external dependencies.

mod expense;
mod idempotency;
mod query;
mod route;
mod session;
mod user;
pub mod result;

pub use expense::{total_amount, Category, CreateExpenseRequest, Expense, ExpenseDraft, NewExpense};
pub use idempotency::IdempotencyKey;
pub use query::{ExpenseQuery, SortOrder};
pub use route::Route;
pub use session::{
    AuthContext, LoginIdentifier, LoginPayload, LoginRequest, RegistrationProfile, Session,
    SessionCell,
};
pub use user::User;
