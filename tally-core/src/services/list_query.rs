//! List query flow - filtered, sorted expense list with a running total
//!
//! Every fetch is stamped with a generation number. Only the response for
//! the newest generation may update the view, so a slow response to an
//! old filter can never overwrite a newer one. Starting a fetch also
//! aborts the one still in flight.
//!
//! A fetch starts on mount, on every filter or sort change, and on every
//! bump of the shared [`RefreshSignal`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::refresh::RefreshSignal;
use crate::domain::result::{Error, Result};
use crate::domain::{total_amount, Category, Expense, ExpenseQuery, SortOrder};
use crate::ports::ExpenseGateway;

pub const LOAD_FAILED: &str = "Failed to load expenses.";

/// Snapshot of what the list shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    /// Generation of the fetch this view belongs to
    pub generation: u64,
    pub query: ExpenseQuery,
    pub loading: bool,
    pub expenses: Vec<Expense>,
    pub total: Decimal,
    pub error: Option<String>,
}

impl ListView {
    fn empty(query: ExpenseQuery) -> Self {
        Self {
            generation: 0,
            query,
            loading: false,
            expenses: Vec::new(),
            total: Decimal::ZERO,
            error: None,
        }
    }
}

struct Shared {
    gateway: Arc<dyn ExpenseGateway>,
    state: watch::Sender<ListView>,
    generation: AtomicU64,
    query: Mutex<ExpenseQuery>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn current_query(&self) -> ExpenseQuery {
        self.query.lock().map(|q| *q).unwrap_or_default()
    }

    /// Start a fetch for the current query, superseding any in flight.
    ///
    /// Filter changes and the refresh watcher may call this concurrently.
    /// Everything happens under the `in_flight` lock, so the stored task is
    /// always the newest generation's.
    fn fetch(self: &Arc<Self>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.current_query();

        self.state.send_modify(|view| {
            view.generation = generation;
            view.query = query;
            view.loading = true;
        });

        let shared = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = shared.gateway.list_expenses(&query).await;
            shared.apply(generation, result);
        });

        if let Some(previous) = in_flight.replace(task) {
            previous.abort();
        }
    }

    /// Apply a response. Returns false when it belongs to a superseded
    /// fetch and was dropped.
    fn apply(&self, generation: u64, result: Result<Vec<Expense>>) -> bool {
        self.state.send_if_modified(|view| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            view.loading = false;
            match result {
                Ok(expenses) => {
                    view.total = total_amount(&expenses);
                    view.expenses = expenses;
                    view.error = None;
                }
                Err(e) => {
                    view.expenses.clear();
                    view.total = Decimal::ZERO;
                    // 401 was already handled by tearing down the session
                    view.error = match e {
                        Error::Authentication => None,
                        other => Some(other.user_message(LOAD_FAILED)),
                    };
                }
            }
            true
        })
    }
}

pub struct ListQueryFlow {
    shared: Arc<Shared>,
    refresh_task: JoinHandle<()>,
}

impl ListQueryFlow {
    /// Start the flow: fetch once now, then again on every refresh signal.
    /// Must be called from within a tokio runtime.
    pub fn mount(
        gateway: Arc<dyn ExpenseGateway>,
        query: ExpenseQuery,
        refresh: &RefreshSignal,
    ) -> Self {
        let (state, _rx) = watch::channel(ListView::empty(query));
        let shared = Arc::new(Shared {
            gateway,
            state,
            generation: AtomicU64::new(0),
            query: Mutex::new(query),
            in_flight: Mutex::new(None),
        });

        shared.fetch();

        let refresh_task = tokio::spawn(watch_refresh(Arc::downgrade(&shared), refresh.subscribe()));

        Self {
            shared,
            refresh_task,
        }
    }

    pub fn query(&self) -> ExpenseQuery {
        self.shared.current_query()
    }

    /// Change the category filter; re-fetches only if it changed
    pub fn set_category(&self, category: Option<Category>) {
        self.update_query(|q| q.category = category);
    }

    /// Change the sort order; re-fetches only if it changed
    pub fn set_sort(&self, sort: SortOrder) {
        self.update_query(|q| q.sort = Some(sort));
    }

    fn update_query(&self, change: impl FnOnce(&mut ExpenseQuery)) {
        let changed = match self.shared.query.lock() {
            Ok(mut query) => {
                let before = *query;
                change(&mut query);
                before != *query
            }
            Err(_) => false,
        };
        if changed {
            self.shared.fetch();
        }
    }

    pub fn view(&self) -> ListView {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.shared.state.subscribe()
    }

    /// Wait until the newest fetch has been applied
    pub async fn settled(&self) -> ListView {
        let mut rx = self.shared.state.subscribe();
        let settled = match rx.wait_for(|view| !view.loading).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        };
        settled
    }
}

impl Drop for ListQueryFlow {
    fn drop(&mut self) {
        self.refresh_task.abort();
        if let Ok(mut in_flight) = self.shared.in_flight.lock() {
            if let Some(task) = in_flight.take() {
                task.abort();
            }
        }
    }
}

async fn watch_refresh(shared: Weak<Shared>, mut signal: watch::Receiver<u64>) {
    while signal.changed().await.is_ok() {
        match shared.upgrade() {
            Some(shared) => shared.fetch(),
            None => break,
        }
    }
}
