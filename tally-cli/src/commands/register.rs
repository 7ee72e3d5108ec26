//! Register command - creates the account, does not log in

use anyhow::{bail, Result};
use dialoguer::Input;
use tally_core::services::{LogEvent, REGISTRATION_FAILED};
use tally_core::{RegistrationProfile, Route};

use super::login::resolve_password;
use super::{block_on, get_context, get_logger, log_event};
use crate::output;

fn field(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if atty::is(atty::Stream::Stdin) => Ok(Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
        None => Ok(String::new()),
    }
}

pub fn run(
    full_name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Signup)?;

    let profile = RegistrationProfile {
        full_name: field(full_name, "Full name")?,
        username: field(username, "Username")?,
        email: field(email, "Email")?,
        password: resolve_password(password, "Password")?,
    };

    let spinner = output::spinner("Creating account...", json);
    let result = block_on(ctx.session_store.register(&profile))?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if !result.success {
        let message = result.error.unwrap_or_else(|| REGISTRATION_FAILED.to_string());
        log_event(
            &logger,
            LogEvent::new("registration_failed")
                .with_command("register")
                .with_endpoint("/users/register")
                .with_error(&message),
        );
        bail!(message);
    }

    log_event(
        &logger,
        LogEvent::new("registration_succeeded")
            .with_command("register")
            .with_endpoint("/users/register"),
    );
    if !json {
        output::success("Account created.");
        output::info("Run `tally login` to sign in.");
    }
    Ok(())
}
