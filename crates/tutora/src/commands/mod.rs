//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod auth;
pub mod cart;
pub mod children;
pub mod config_cmd;
pub mod favorites;
pub mod reservations;
pub mod sessions;
pub mod util;

use tutora_core::Tutora;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a platform-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    app: &Tutora,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(app, args, resolved, global).await,
        Command::Register(args) => auth::register(app, args, resolved, global).await,
        Command::Logout => auth::logout(app, global),
        Command::Status => auth::status(app, global),
        Command::Children(args) => children::handle(app, args, global).await,
        Command::Sessions(args) => sessions::handle(app, args, global).await,
        Command::Reserve(args) => sessions::reserve(app, args, global).await,
        Command::Reservations(args) => reservations::handle(app, args, global).await,
        Command::Cart(args) => cart::handle(app, args, global).await,
        Command::Favorites(args) => favorites::handle(app, args, global).await,
        Command::Follow(args) => favorites::follow(app, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config commands are handled before dispatch".into(),
        )),
    }
}
