//! Authentication commands.

use super::Context;
use crate::output::{self, row};
use anyhow::{bail, Result};
use board_auth::{AuthBootstrapper, BootstrapOutcome, SessionActions, SessionStore};
use board_protocol_types::UserRecord;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
struct StatusReport {
    api_url: String,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", row("Server", &self.api_url))?;
        match &self.user {
            Some(user) => {
                writeln!(f, "{}", row("Auth", "logged in"))?;
                writeln!(f, "{}", row("User", &user.display_name()))?;
                write!(f, "{}", row("Email", &user.email))
            }
            None => {
                writeln!(f, "{}", row("Auth", "not logged in"))?;
                write!(
                    f,
                    "{}",
                    row("Reason", self.message.as_deref().unwrap_or("-"))
                )
            }
        }
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    Ok(email.trim().to_string())
}

/// Log in with email and password, prompting for whatever was not given.
pub async fn login(ctx: &Context, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email()?,
    };
    if email.is_empty() {
        bail!("Email is required");
    }

    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        bail!("Password is required");
    }

    let actions = SessionActions::new(ctx.client.clone(), SessionStore::new());
    match actions.login(&email, &password).await {
        Ok(user) => {
            ctx.save_session()?;
            output::print_success(&format!("Logged in as {}", user.email), ctx.format);
            Ok(())
        }
        Err(e) => bail!("Login failed: {}", e),
    }
}

/// Log out on the server and forget the saved session.
pub async fn logout(ctx: &Context) -> Result<()> {
    let actions = SessionActions::new(ctx.client.clone(), SessionStore::new());
    let result = actions.logout().await;
    crate::session_file::clear(&ctx.paths.session_file())?;

    match result {
        Ok(()) => output::print_success("Logged out successfully", ctx.format),
        Err(e) => output::print_success(
            &format!("Local session cleared (server logout failed: {})", e),
            ctx.format,
        ),
    }
    Ok(())
}

/// Run the startup auth check and report the outcome.
pub async fn status(ctx: &Context) -> Result<()> {
    let bootstrapper = AuthBootstrapper::new(ctx.client.clone(), SessionStore::new());
    let outcome = bootstrapper.run().await;
    ctx.save_session()?;

    let report = match outcome {
        BootstrapOutcome::Authenticated(user) => StatusReport {
            api_url: ctx.client.base_url().to_string(),
            authenticated: true,
            user: Some(user),
            message: None,
        },
        BootstrapOutcome::Unauthenticated { message } => StatusReport {
            api_url: ctx.client.base_url().to_string(),
            authenticated: false,
            user: None,
            message: Some(message),
        },
    };
    output::print(&report, ctx.format);
    Ok(())
}
