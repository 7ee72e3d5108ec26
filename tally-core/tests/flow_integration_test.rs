//! Submission and list flows working together over one gateway
//!
//! Run with: cargo test --test flow_integration_test

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use tally_core::domain::result::Result;
use tally_core::domain::CreateExpenseRequest;
use tally_core::ports::ExpenseGateway;
use tally_core::services::{
    ListQueryFlow, RefreshSignal, SubmissionFlow, SubmissionSettings, SubmissionStatus,
};
use tally_core::{Category, Error, Expense, ExpenseQuery, IdempotencyKey, SortOrder};

/// In-memory backend that deduplicates by idempotency key
#[derive(Default)]
struct Ledger {
    expenses: Mutex<Vec<(IdempotencyKey, Expense)>>,
    fail_next: Mutex<bool>,
}

impl Ledger {
    fn stored(&self) -> usize {
        self.expenses.lock().unwrap().len()
    }
}

#[async_trait]
impl ExpenseGateway for Ledger {
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<Expense> {
        let mut expenses = self.expenses.lock().unwrap();
        if let Some((_, existing)) = expenses
            .iter()
            .find(|(key, _)| *key == request.idempotency_key)
        {
            return Ok(existing.clone());
        }

        let expense = Expense {
            id: format!("exp-{}", expenses.len() + 1),
            amount: request.amount,
            category: request.category,
            description: request.description.clone(),
            date: request.date,
        };
        expenses.push((request.idempotency_key, expense.clone()));

        // Stored, but the acknowledgement is lost
        let mut fail_next = self.fail_next.lock().unwrap();
        if *fail_next {
            *fail_next = false;
            return Err(Error::network("connection reset"));
        }
        Ok(expense)
    }

    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        let mut listed: Vec<Expense> = self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .filter(|e| query.category.map_or(true, |c| e.category == c))
            .collect();
        listed.sort_by_key(|e| e.date);
        if query.sort.unwrap_or_default() == SortOrder::DateDesc {
            listed.reverse();
        }
        Ok(listed)
    }
}

fn fill(flow: &mut SubmissionFlow, amount: &str, category: &str, date: &str, description: &str) {
    let draft = flow.draft_mut();
    draft.amount = amount.to_string();
    draft.category = category.to_string();
    draft.date = date.to_string();
    draft.description = description.to_string();
}

async fn next_view(list: &ListQueryFlow, generation: u64) -> tally_core::services::ListView {
    let mut rx = list.subscribe();
    let view = rx
        .wait_for(|v| v.generation > generation && !v.loading)
        .await
        .unwrap()
        .clone();
    view
}

#[tokio::test]
async fn test_created_expense_appears_in_mounted_list() {
    let ledger = Arc::new(Ledger::default());
    let refresh = RefreshSignal::new();

    let list = ListQueryFlow::mount(ledger.clone(), ExpenseQuery::default(), &refresh);
    let initial = list.settled().await;
    assert!(initial.expenses.is_empty());

    let mut form = SubmissionFlow::new(ledger.clone(), refresh.clone(), SubmissionSettings::default());
    fill(&mut form, "250.50", "Food", "2024-01-15", "");
    form.submit().await.unwrap();
    assert_eq!(form.status(), SubmissionStatus::Success);

    let view = next_view(&list, initial.generation).await;
    assert_eq!(view.expenses.len(), 1);
    assert_eq!(view.expenses[0].label(), "Food");
    assert_eq!(view.total, Decimal::new(25050, 2));
}

#[tokio::test]
async fn test_lost_acknowledgement_is_not_duplicated() {
    let ledger = Arc::new(Ledger::default());
    *ledger.fail_next.lock().unwrap() = true;
    let refresh = RefreshSignal::new();

    let mut form = SubmissionFlow::new(ledger.clone(), refresh.clone(), SubmissionSettings::default());
    fill(&mut form, "99.99", "Travel", "2024-01-20", "Taxi");

    form.submit().await.unwrap_err();
    assert!(matches!(form.status(), SubmissionStatus::Error(_)));
    assert_eq!(refresh.count(), 0);

    form.submit().await.unwrap();
    assert_eq!(ledger.stored(), 1);
    assert_eq!(refresh.count(), 1);
}

#[tokio::test]
async fn test_filter_and_sort_over_ledger() {
    let ledger = Arc::new(Ledger::default());
    let refresh = RefreshSignal::new();
    let mut form = SubmissionFlow::new(ledger.clone(), refresh.clone(), SubmissionSettings::default());

    for (amount, category, date) in [
        ("10", "Travel", "2024-01-03"),
        ("20", "Food", "2024-01-01"),
        ("30", "Travel", "2024-01-02"),
    ] {
        fill(&mut form, amount, category, date, "");
        form.submit().await.unwrap();
    }

    let list = ListQueryFlow::mount(ledger.clone(), ExpenseQuery::default(), &refresh);
    let all = list.settled().await;
    assert_eq!(all.expenses.len(), 3);
    assert_eq!(all.total, Decimal::new(60, 0));

    list.set_category(Some(Category::Travel));
    list.set_sort(SortOrder::DateAsc);
    let travel = list.settled().await;

    let dates: Vec<String> = travel.expenses.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-02", "2024-01-03"]);
    assert_eq!(travel.total, Decimal::new(40, 0));
    assert_eq!(travel.query.category, Some(Category::Travel));
}
