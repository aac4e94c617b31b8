//! Account handlers: login, register, logout, status.

use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use tutora_core::{ApplicationPhase, Child, RegisterRequest, Tutora};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

/// Profile password, or an interactive prompt when none is configured.
fn password_for(resolved: &Resolved) -> Result<SecretString, CliError> {
    match resolved.password() {
        Err(CliError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            rpassword::prompt_password("Password: ")
                .map(SecretString::from)
                .map_err(CliError::Io)
        }
        other => other,
    }
}

fn mobile_for(explicit: Option<String>, resolved: &Resolved) -> Result<String, CliError> {
    if let Some(mobile) = explicit.or_else(|| resolved.profile.mobile.clone()) {
        return Ok(mobile);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "mobile".into(),
            reason: "pass --mobile or set it with: tutora config set mobile <number>".into(),
        });
    }
    dialoguer::Input::new()
        .with_prompt("Mobile number")
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

fn phase_hint(phase: ApplicationPhase) -> &'static str {
    match phase {
        ApplicationPhase::NeedsChild => {
            "No child profile yet. Create one with: tutora children add --first-name <name> --level <id>"
        }
        ApplicationPhase::HasChildren => "Pick a child with: tutora children switch <id>",
        ApplicationPhase::Unauthenticated => "",
    }
}

pub async fn login(
    app: &Tutora,
    args: LoginArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mobile = mobile_for(args.mobile, resolved)?;
    let password = password_for(resolved)?;

    let phase = app.login(&mobile, &password).await?;
    util::report(global, &format!("Signed in as {mobile}"));
    if !global.quiet {
        eprintln!("{}", phase_hint(phase));
    }
    Ok(())
}

pub async fn register(
    app: &Tutora,
    args: RegisterArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = password_for(resolved)?;
    if password.expose_secret().is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let request = RegisterRequest {
        first_name: args.first_name,
        last_name: args.last_name,
        mobile: args.mobile,
        email: args.email,
        password: password.expose_secret().to_owned(),
    };
    let phase = app.register(&request).await?;
    util::report(global, &format!("Account created for {}", request.mobile));
    if !global.quiet {
        eprintln!("{}", phase_hint(phase));
    }
    Ok(())
}

pub fn logout(app: &Tutora, global: &GlobalOpts) -> Result<(), CliError> {
    app.logout();
    util::report(global, "Signed out");
    Ok(())
}

#[derive(Serialize)]
struct Status {
    phase: String,
    active_child: Option<Child>,
    children: usize,
}

pub fn status(app: &Tutora, global: &GlobalOpts) -> Result<(), CliError> {
    let identity = app.state().identity();
    let status = Status {
        phase: identity.phase().to_string(),
        active_child: identity.active_child.clone(),
        children: identity.children.len(),
    };

    let out = output::render_single(
        &global.output,
        &status,
        |s| {
            let child = s
                .active_child
                .as_ref()
                .map_or_else(|| "(none)".into(), |c| format!("{} (#{})", c.display_name(), c.id));
            format!(
                "Status:        {}\nActive child:  {child}\nChildren:      {}",
                s.phase, s.children
            )
        },
        |s| s.phase.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
