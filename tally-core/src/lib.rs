//! Tally Core - client request lifecycle for the Tally expense tracker
//!
//! Hexagonal layout:
//!
//! - **domain**: Core entities (User, Session, Expense, drafts and queries)
//! - **ports**: Traits at the seams (ExpenseGateway, SessionStorage, Navigator)
//! - **services**: Session store, submission flow, list query flow, event log
//! - **adapters**: reqwest API client with the unauthorized guard, file storage

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{ApiClient, AuthFailureGuard, FileSessionStorage, HttpExpenseGateway, MemoryNavigator};
use config::Config;
use services::*;

pub use domain::result::{Error, OperationResult};
pub use domain::{
    Category, Expense, ExpenseDraft, ExpenseQuery, IdempotencyKey, LoginIdentifier,
    RegistrationProfile, Route, Session, SessionCell, SortOrder, User,
};

/// Everything one client instance needs, wired together.
///
/// The session cell, storage and navigator are shared between the
/// session store and the unauthorized guard inside the API client, so a
/// 401 on any request is seen by all of them.
pub struct TallyContext {
    pub tally_dir: PathBuf,
    pub config: Config,
    pub session: SessionCell,
    pub navigator: Arc<MemoryNavigator>,
    pub storage: Arc<FileSessionStorage>,
    pub client: ApiClient,
    pub session_store: SessionStore,
    pub gateway: Arc<HttpExpenseGateway>,
    pub refresh: RefreshSignal,
}

impl TallyContext {
    /// Create a context rooted at `tally_dir` and restore any persisted
    /// session
    pub fn new(tally_dir: &Path) -> Result<Self> {
        let config = Config::load(tally_dir)?;

        let session = SessionCell::new();
        let navigator = Arc::new(MemoryNavigator::default());
        let storage = Arc::new(FileSessionStorage::new(tally_dir));

        let guard = AuthFailureGuard::new(session.clone(), storage.clone(), navigator.clone());
        let client = ApiClient::new(&config.api_base_url, config.request_timeout, guard)
            .context("Failed to create API client")?;

        let session_store = SessionStore::new(client.clone(), storage.clone(), session.clone());
        session_store
            .restore()
            .context("Failed to restore session")?;

        let gateway = Arc::new(HttpExpenseGateway::new(client.clone(), session.clone()));

        Ok(Self {
            tally_dir: tally_dir.to_path_buf(),
            config,
            session,
            navigator,
            storage,
            client,
            session_store,
            gateway,
            refresh: RefreshSignal::new(),
        })
    }

    /// A fresh add-expense form
    pub fn submission_flow(&self) -> SubmissionFlow {
        SubmissionFlow::new(
            self.gateway.clone(),
            self.refresh.clone(),
            self.config.submission_settings(),
        )
    }

    /// An add-expense form resuming a failed attempt with its original key
    pub fn resume_submission(&self, pending: PendingSubmission) -> SubmissionFlow {
        SubmissionFlow::resume(
            self.gateway.clone(),
            self.refresh.clone(),
            self.config.submission_settings(),
            pending,
        )
    }

    /// Mount an expense list. Must be called inside a tokio runtime.
    pub fn list_flow(&self, query: ExpenseQuery) -> ListQueryFlow {
        ListQueryFlow::mount(self.gateway.clone(), query, &self.refresh)
    }
}
