//! List command - expenses and their total

use anyhow::{bail, Result};
use colored::Colorize;
use tally_core::services::{ListView, LogEvent};
use tally_core::{Category, ExpenseQuery, Route, SortOrder};

use super::{block_on, get_context, get_logger, log_event, report_redirect, require_session};
use crate::output;

pub fn run(category: Option<String>, sort: &str, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Home)?;
    require_session(&ctx, &logger)?;

    let category = category.map(|c| c.parse::<Category>()).transpose()?;
    let sort: SortOrder = sort.parse()?;
    let query = ExpenseQuery::new(category, Some(sort));

    let spinner = output::spinner("Loading expenses...", json);
    let view = block_on(async { ctx.list_flow(query).settled().await })?;
    spinner.finish_and_clear();

    if report_redirect(&ctx, &logger) {
        bail!("Expenses were not loaded.");
    }
    if let Some(error) = &view.error {
        log_event(
            &logger,
            LogEvent::new("expense_list_failed")
                .with_command("list")
                .with_endpoint("/expenses")
                .with_error(error),
        );
        bail!(error.clone());
    }

    if let Some(l) = &logger {
        let _ = l.log_command("list");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &ListView) {
    let heading = match view.query.category {
        Some(category) => format!("{} expenses", category),
        None => "All expenses".to_string(),
    };
    println!("{}", heading.bold());

    if view.expenses.is_empty() {
        println!("No expenses found.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Category", "Description", "Amount"]);
    for expense in &view.expenses {
        table.add_row(vec![
            expense.date.to_string(),
            expense.category.to_string(),
            expense.label().to_string(),
            output::format_amount(expense.amount),
        ]);
    }
    println!("{}", table);
    println!(
        "{} {}",
        "Total:".bold(),
        output::format_amount(view.total).bold()
    );
}
