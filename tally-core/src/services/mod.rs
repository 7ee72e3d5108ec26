//! Service layer - request lifecycle orchestration
//!
//! Services sit between the presentation layer and the ports: the session
//! store owns authentication state, the two flows drive expense creation
//! and listing, and the refresh signal links them.

pub mod list_query;
pub mod logging;
mod pending;
mod refresh;
mod session;
pub mod submission;

pub use list_query::{ListQueryFlow, ListView, LOAD_FAILED};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use pending::PendingSubmission;
pub use refresh::RefreshSignal;
pub use session::{SessionStore, LOGIN_FAILED, REGISTRATION_FAILED};
pub use submission::{SubmissionFlow, SubmissionSettings, SubmissionStatus, CREATE_FAILED};
