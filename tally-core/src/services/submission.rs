//! Submission flow - the add-expense state machine
//!
//! ```text
//! idle --submit(valid)--> submitting --ack--> success --(display window)--> idle
//!                                    \--fail--> error --submit--> ...
//! ```
//!
//! Invalid input never leaves `idle` and never reaches the network. A
//! successful submission resets the form, rotates the idempotency key and
//! bumps the refresh signal. A failed one keeps both the form and the key,
//! so resubmitting the same form is deduplicated by the backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::time::Instant;

use super::pending::PendingSubmission;
use super::refresh::RefreshSignal;
use crate::domain::result::{Error, Result};
use crate::domain::{CreateExpenseRequest, Expense, ExpenseDraft, IdempotencyKey};
use crate::ports::ExpenseGateway;

pub const CREATE_FAILED: &str = "Failed to create expense. Please try again.";

/// Observable state of the flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Success,
    Error(String),
}

/// Timing knobs for the flow
#[derive(Debug, Clone, Copy)]
pub struct SubmissionSettings {
    /// Upper bound on one create request
    pub timeout: Duration,
    /// How long `Success` is shown before reverting to `Idle`
    pub success_display: Duration,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            success_display: Duration::from_secs(3),
        }
    }
}

pub struct SubmissionFlow {
    gateway: Arc<dyn ExpenseGateway>,
    refresh: RefreshSignal,
    settings: SubmissionSettings,
    today: fn() -> NaiveDate,
    draft: ExpenseDraft,
    key: IdempotencyKey,
    /// Draft last sent with `key`; `None` until the first attempt
    attempted: Option<ExpenseDraft>,
    status: SubmissionStatus,
    succeeded_at: Option<Instant>,
    validation_error: Option<String>,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl SubmissionFlow {
    /// Mount a fresh form with a new idempotency key
    pub fn new(
        gateway: Arc<dyn ExpenseGateway>,
        refresh: RefreshSignal,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            gateway,
            refresh,
            settings,
            today: local_today,
            draft: ExpenseDraft::blank(local_today()),
            key: IdempotencyKey::generate(),
            attempted: None,
            status: SubmissionStatus::Idle,
            succeeded_at: None,
            validation_error: None,
        }
    }

    /// Mount a form holding a previously failed attempt, keeping its key
    pub fn resume(
        gateway: Arc<dyn ExpenseGateway>,
        refresh: RefreshSignal,
        settings: SubmissionSettings,
        pending: PendingSubmission,
    ) -> Self {
        let mut flow = Self::new(gateway, refresh, settings);
        flow.draft = pending.draft.clone();
        flow.key = pending.idempotency_key;
        flow.attempted = Some(pending.draft);
        flow
    }

    /// Override the clock used for the reset date
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self.draft = ExpenseDraft::blank(today());
        self
    }

    pub fn draft(&self) -> &ExpenseDraft {
        &self.draft
    }

    /// Edit the form. Editing never rotates the key by itself.
    pub fn draft_mut(&mut self) -> &mut ExpenseDraft {
        &mut self.draft
    }

    pub fn idempotency_key(&self) -> IdempotencyKey {
        self.key
    }

    /// Message from the last rejected-by-validation submit
    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Current status, with `Success` reverting to `Idle` once the
    /// display window has passed
    pub fn status(&self) -> SubmissionStatus {
        match (&self.status, self.succeeded_at) {
            (SubmissionStatus::Success, Some(at)) if at.elapsed() >= self.settings.success_display => {
                SubmissionStatus::Idle
            }
            (status, _) => status.clone(),
        }
    }

    /// The failed attempt, ready to be retried later with the same key
    pub fn pending(&self) -> Option<PendingSubmission> {
        match (&self.status, &self.attempted) {
            (SubmissionStatus::Error(_), Some(draft)) => Some(PendingSubmission {
                draft: draft.clone(),
                idempotency_key: self.key,
            }),
            _ => None,
        }
    }

    /// Validate and send the form. Exactly one create request per call
    /// that passes validation; no automatic retry.
    pub async fn submit(&mut self) -> Result<Expense> {
        self.validation_error = None;
        self.succeeded_at = None;

        let expense = match self.draft.validate() {
            Ok(expense) => expense,
            Err(e) => {
                self.status = SubmissionStatus::Idle;
                self.validation_error = Some(e.user_message(CREATE_FAILED));
                return Err(e);
            }
        };

        // A changed form after a failure is a different logical
        // submission and must not share the failed attempt's key.
        if let Some(previous) = &self.attempted {
            if previous != &self.draft {
                self.key = IdempotencyKey::generate();
            }
        }
        self.attempted = Some(self.draft.clone());
        self.status = SubmissionStatus::Submitting;

        let request = CreateExpenseRequest::new(expense, self.key);
        let result = match tokio::time::timeout(
            self.settings.timeout,
            self.gateway.create_expense(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::network("Request timed out")),
        };

        match result {
            Ok(created) => {
                self.draft = ExpenseDraft::blank((self.today)());
                self.key = IdempotencyKey::generate();
                self.attempted = None;
                self.status = SubmissionStatus::Success;
                self.succeeded_at = Some(Instant::now());
                self.refresh.notify();
                Ok(created)
            }
            Err(Error::Authentication) => {
                // Handled globally (session torn down, redirected)
                self.status = SubmissionStatus::Idle;
                Err(Error::Authentication)
            }
            Err(e) => {
                self.status = SubmissionStatus::Error(e.user_message(CREATE_FAILED));
                Err(e)
            }
        }
    }
}
