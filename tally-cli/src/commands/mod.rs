//! CLI command implementations

pub mod add;
pub mod config;
pub mod list;
pub mod login;
pub mod logout;
pub mod logs;
pub mod register;
pub mod status;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tally_core::ports::Navigator;
use tally_core::services::{EntryPoint, LogEvent, LoggingService};
use tally_core::{Route, TallyContext};

use crate::output;

/// Open the event log. `None` if it cannot be opened; logging never
/// blocks a command.
pub fn get_logger() -> Option<LoggingService> {
    let tally_dir = get_tally_dir().ok()?;
    std::fs::create_dir_all(&tally_dir).ok()?;
    LoggingService::new(&tally_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// `$TALLY_DIR`, else `~/.tally`
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .ok_or_else(|| anyhow!("Could not find home directory; set TALLY_DIR"))
}

/// Build the client context with the navigator on `route`
pub fn get_context(route: Route) -> Result<TallyContext> {
    let tally_dir = get_tally_dir()?;
    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;

    let ctx = TallyContext::new(&tally_dir).context("Failed to initialize tally context")?;
    ctx.navigator.visit(route);
    Ok(ctx)
}

/// Drive one async command to completion
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Commands behind login. Without a session the client goes to login.
pub fn require_session(ctx: &TallyContext, logger: &Option<LoggingService>) -> Result<()> {
    if ctx.session_store.is_authenticated() {
        return Ok(());
    }
    ctx.navigator.redirect(Route::Login);
    if let Some(l) = logger {
        let _ = l.log_redirect(Route::Login.as_str());
    }
    bail!("Not logged in. Run `tally login` first.")
}

/// Tell the user when a request ended their session
pub fn report_redirect(ctx: &TallyContext, logger: &Option<LoggingService>) -> bool {
    if !ctx.navigator.redirects().contains(&Route::Login) {
        return false;
    }
    log_event(logger, LogEvent::new("session_expired").with_route(Route::Login.as_str()));
    output::warning("Your session has expired. Run `tally login` to sign in again.");
    true
}
