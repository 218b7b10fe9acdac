//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod resource;
pub mod rows;
pub mod util;

use portico_core::{Announcement, Controller, Document, Gallery, NewsItem, Role, User, Violation};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::resource::handle;

/// Dispatch an API-bound command to the resource handler for its entity.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Announcements(args) => {
            handle::<Announcement>(controller, args.command.into(), global).await
        }
        Command::Documents(args) => handle::<Document>(controller, args.command.into(), global).await,
        Command::Galleries(args) => handle::<Gallery>(controller, args.command.into(), global).await,
        Command::News(args) => handle::<NewsItem>(controller, args.command.into(), global).await,
        Command::Violations(args) => {
            handle::<Violation>(controller, args.command.into(), global).await
        }
        Command::Roles(args) => handle::<Role>(controller, args.command.into(), global).await,
        Command::Users(args) => handle::<User>(controller, args.command.into(), global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a connection".into(),
        )),
    }
}
