//! Add command - submit one expense
//!
//! A failed submission leaves its form and idempotency key in
//! `pending_expense.json`; `tally add --retry` sends exactly that again,
//! so a create that reached the backend before the failure is not
//! duplicated.

use anyhow::{anyhow, bail, Result};
use colored::Colorize;
use dialoguer::{Input, Select};
use tally_core::services::{
    LogEvent, LoggingService, PendingSubmission, SubmissionFlow, SubmissionStatus, CREATE_FAILED,
};
use tally_core::{Category, Error, Expense, Route, TallyContext};

use super::{block_on, get_context, get_logger, log_event, report_redirect, require_session};
use crate::output;

pub struct AddArgs {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

pub fn run(args: AddArgs, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Home)?;
    require_session(&ctx, &logger)?;

    if PendingSubmission::load(&ctx.tally_dir)?.is_some() && !json {
        output::warning("A previous expense failed to submit; it is replaced by this one.");
        PendingSubmission::clear(&ctx.tally_dir)?;
    }

    let mut flow = ctx.submission_flow();
    fill_draft(&mut flow, args)?;
    submit(&ctx, &logger, flow, json)
}

pub fn run_retry(json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Home)?;
    require_session(&ctx, &logger)?;

    let pending = PendingSubmission::load(&ctx.tally_dir)?
        .ok_or_else(|| anyhow!("No failed expense to retry."))?;
    let flow = ctx.resume_submission(pending);
    submit(&ctx, &logger, flow, json)
}

/// Flags first; anything missing is prompted for on a terminal
fn fill_draft(flow: &mut SubmissionFlow, args: AddArgs) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let draft = flow.draft_mut();

    match args.amount {
        Some(amount) => draft.amount = amount,
        None if interactive => {
            draft.amount = Input::new()
                .with_prompt("Amount")
                .allow_empty(true)
                .interact_text()?
        }
        None => {}
    }

    match args.category {
        Some(category) => draft.category = category,
        None if interactive => {
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            let choice = Select::new()
                .with_prompt("Category")
                .items(&names)
                .default(0)
                .interact()?;
            draft.category = names[choice].to_string();
        }
        None => {}
    }

    match args.description {
        Some(description) => draft.description = description,
        None if interactive => {
            draft.description = Input::new()
                .with_prompt("Description (optional)")
                .allow_empty(true)
                .interact_text()?
        }
        None => {}
    }

    match args.date {
        Some(date) => draft.date = date,
        None if interactive => {
            let today = draft.date.clone();
            draft.date = Input::new()
                .with_prompt("Date")
                .default(today)
                .interact_text()?
        }
        None => {}
    }

    Ok(())
}

fn submit(
    ctx: &TallyContext,
    logger: &Option<LoggingService>,
    mut flow: SubmissionFlow,
    json: bool,
) -> Result<()> {
    let spinner = output::spinner("Saving expense...", json);
    let result = block_on(flow.submit())?;
    spinner.finish_and_clear();

    let event = |name: &str| {
        LogEvent::new(name)
            .with_command("add")
            .with_route(Route::Home.as_str())
            .with_endpoint("/expenses")
    };

    match result {
        Ok(expense) => {
            PendingSubmission::clear(&ctx.tally_dir)?;
            log_event(logger, event("expense_created"));
            print_created(&expense, json)?;
            Ok(())
        }
        Err(Error::Validation(_)) => {
            let message = flow
                .validation_error()
                .unwrap_or("Invalid expense")
                .to_string();
            bail!(message)
        }
        Err(Error::Authentication) => {
            report_redirect(ctx, logger);
            bail!("Expense was not saved.")
        }
        Err(e) => {
            if let Some(pending) = flow.pending() {
                pending.save(&ctx.tally_dir)?;
            }
            let message = match flow.status() {
                SubmissionStatus::Error(message) => message,
                _ => CREATE_FAILED.to_string(),
            };
            log_event(
                logger,
                event("expense_create_failed")
                    .with_error(&message)
                    .with_error_details(e.to_string()),
            );
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message,
                        "idempotencyKey": flow.idempotency_key().to_string(),
                    })
                );
            } else {
                output::info("Run `tally add --retry` to resubmit the same expense.");
            }
            bail!(message)
        }
    }
}

fn print_created(expense: &Expense, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(expense)?);
        return Ok(());
    }
    output::success("Expense created");
    println!(
        "  {} {} on {}",
        output::format_amount(expense.amount).bold(),
        expense.category,
        expense.date
    );
    if let Some(description) = &expense.description {
        println!("  {}", description.dimmed());
    }
    Ok(())
}
