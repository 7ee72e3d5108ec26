//! Status command - session and backend summary

use anyhow::Result;
use colored::Colorize;
use tally_core::services::PendingSubmission;
use tally_core::Route;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context(Route::Home)?;
    let user = ctx.session_store.current_user();
    let pending = PendingSubmission::load(&ctx.tally_dir)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "apiBaseUrl": ctx.client.base_url(),
                "tallyDir": ctx.tally_dir.to_string_lossy(),
                "user": user,
                "pendingSubmission": pending.is_some(),
            }))?
        );
        return Ok(());
    }

    println!("{}", "Tally Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Backend", ctx.client.base_url()]);
    table.add_row(vec!["Data directory", &ctx.tally_dir.display().to_string()]);
    match &user {
        Some(user) => {
            table.add_row(vec!["User", &format!("{} (@{})", user.full_name, user.username)]);
            table.add_row(vec!["Email", &user.email]);
        }
        None => {
            table.add_row(vec!["User", "not logged in"]);
        }
    }
    println!("{}", table);

    if pending.is_some() {
        println!();
        output::warning("A failed expense is waiting. Run `tally add --retry` to resubmit it.");
    }
    Ok(())
}
