//! Expense domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::result::{Error, Result};
use super::IdempotencyKey;

/// Expense category, fixed set shared with the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Utilities,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Case-insensitive, so CLI input like `travel` is accepted
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Unknown category '{}'. Choose one of: Food, Travel, Utilities, Entertainment, Other",
                    trimmed
                ))
            })
    }
}

/// An expense record as held by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_amount", serialize_with = "serialize_amount")]
    pub amount: Decimal,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
}

impl Expense {
    /// Description to display, falling back to the category name
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => self.category.as_str(),
        }
    }
}

/// Raw form fields as the user typed them.
///
/// Nothing here is trusted until [`ExpenseDraft::validate`] turns it into
/// a [`NewExpense`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

impl ExpenseDraft {
    /// Default form: empty fields, today's date
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            category: String::new(),
            description: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
        }
    }

    /// Check every field and produce the validated expense
    pub fn validate(&self) -> Result<NewExpense> {
        let amount_str = self.amount.trim();
        if amount_str.is_empty() {
            return Err(Error::validation("Amount is required"));
        }
        let amount: Decimal = amount_str
            .parse()
            .map_err(|_| Error::validation(format!("Invalid amount '{}'", amount_str)))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::validation("Amount cannot be negative"));
        }

        if self.category.trim().is_empty() {
            return Err(Error::validation("Category is required"));
        }
        let category: Category = self.category.parse()?;

        let date_str = self.date.trim();
        if date_str.is_empty() {
            return Err(Error::validation("Date is required"));
        }
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| Error::validation("Invalid date format. Use YYYY-MM-DD"))?;

        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        Ok(NewExpense {
            amount,
            category,
            description,
            date,
        })
    }
}

/// A validated expense ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: Category,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Body of `POST /expenses`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    #[serde(serialize_with = "serialize_amount")]
    pub amount: Decimal,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub idempotency_key: IdempotencyKey,
}

impl CreateExpenseRequest {
    pub fn new(expense: NewExpense, idempotency_key: IdempotencyKey) -> Self {
        Self {
            amount: expense.amount,
            category: expense.category,
            description: expense.description,
            date: expense.date,
            idempotency_key,
        }
    }
}

/// Sum of amounts, used for the displayed total
pub fn total_amount(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Serialize amount as its exact decimal string, scale included
fn serialize_amount<S>(amount: &Decimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(amount)
}

/// Deserialize amount that can be number or string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => {
            let s = n.to_string();
            s.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&s))
                .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e)))
        }
        JsonValue::String(s) => s
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        _ => Err(D::Error::custom("expected number or string for amount")),
    }
}

/// Deserialize a date given as `YYYY-MM-DD` or a full RFC 3339 timestamp
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.date_naive())
        .map_err(|_| D::Error::custom(format!("invalid date '{}'", s)))
}
