//! Logout command

use anyhow::Result;
use tally_core::services::LogEvent;
use tally_core::Route;

use super::{block_on, get_context, get_logger, log_event};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Home)?;
    let was_logged_in = ctx.session_store.is_authenticated();

    block_on(ctx.session_store.logout())??;

    log_event(&logger, LogEvent::new("logged_out").with_command("logout"));

    if json {
        println!("{}", serde_json::json!({ "loggedOut": was_logged_in }));
    } else if was_logged_in {
        output::success("Logged out.");
    } else {
        output::info("No active session.");
    }
    Ok(())
}
