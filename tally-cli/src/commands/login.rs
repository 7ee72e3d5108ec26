//! Login command

use anyhow::{bail, Result};
use dialoguer::{Input, Password};
use tally_core::services::LogEvent;
use tally_core::{LoginIdentifier, Route};

use super::{block_on, get_context, get_logger, log_event};
use crate::output;

/// `--password`, then `TALLY_PASSWORD`, then an interactive prompt
pub fn resolve_password(flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var("TALLY_PASSWORD") {
        return Ok(p);
    }
    if atty::isnt(atty::Stream::Stdin) {
        return Ok(String::new());
    }
    Ok(Password::new().with_prompt(prompt).allow_empty_password(true).interact()?)
}

/// An `@` in a typed identifier means email
fn identifier_from_prompt(raw: String) -> (Option<String>, Option<String>) {
    if raw.contains('@') {
        (Some(raw), None)
    } else {
        (None, Some(raw))
    }
}

pub fn run(
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(Route::Login)?;

    let (email, username) = if email.is_none() && username.is_none() && atty::is(atty::Stream::Stdin) {
        let raw: String = Input::new()
            .with_prompt("Email or username")
            .interact_text()?;
        identifier_from_prompt(raw)
    } else {
        (email, username)
    };
    let identifier = LoginIdentifier::from_parts(email, username)?;
    let password = resolve_password(password, "Password")?;

    let spinner = output::spinner("Logging in...", json);
    let result = block_on(ctx.session_store.login(&identifier, &password))?;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match (result.success, result.data) {
        (true, Some(user)) => {
            log_event(
                &logger,
                LogEvent::new("login_succeeded")
                    .with_command("login")
                    .with_endpoint("/users/login"),
            );
            if !json {
                output::success(&format!("Logged in as {} (@{})", user.full_name, user.username));
            }
            Ok(())
        }
        _ => {
            let message = result
                .error
                .unwrap_or_else(|| tally_core::services::LOGIN_FAILED.to_string());
            log_event(
                &logger,
                LogEvent::new("login_failed")
                    .with_command("login")
                    .with_endpoint("/users/login")
                    .with_error(&message),
            );
            bail!(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompted_identifier_detects_email() {
        assert_eq!(
            identifier_from_prompt("asha@example.com".to_string()),
            (Some("asha@example.com".to_string()), None)
        );
        assert_eq!(
            identifier_from_prompt("asha".to_string()),
            (None, Some("asha".to_string()))
        );
    }
}
