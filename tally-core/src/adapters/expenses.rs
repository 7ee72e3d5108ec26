//! HTTP implementation of the expense gateway

use async_trait::async_trait;

use super::http::ApiClient;
use crate::domain::result::Result;
use crate::domain::{CreateExpenseRequest, Expense, ExpenseQuery, SessionCell};
use crate::ports::ExpenseGateway;

/// Expense endpoints over [`ApiClient`].
///
/// Reads the bearer token from the shared session on every call, so the
/// token is attached until the session is cleared.
#[derive(Clone)]
pub struct HttpExpenseGateway {
    client: ApiClient,
    session: SessionCell,
}

impl HttpExpenseGateway {
    pub fn new(client: ApiClient, session: SessionCell) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl ExpenseGateway for HttpExpenseGateway {
    async fn create_expense(&self, request: &CreateExpenseRequest) -> Result<Expense> {
        self.client
            .post_json("/expenses", request, &self.session.auth_context())
            .await
    }

    async fn list_expenses(&self, query: &ExpenseQuery) -> Result<Vec<Expense>> {
        self.client
            .get_json("/expenses", &query.to_pairs(), &self.session.auth_context())
            .await
    }
}
