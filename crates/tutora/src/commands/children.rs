//! Child profile handlers.

use tutora_core::{ChildId, LevelId, NewChild, Tutora};

use crate::cli::{ChildrenArgs, ChildrenCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, ChildRow};

use super::util;

pub async fn handle(app: &Tutora, args: ChildrenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ChildrenCommand::List { refresh } => {
            let children = if refresh {
                app.identity().refresh_children().await?
            } else {
                app.state().identity().children.clone()
            };
            let active = app.state().active_child_id().ok();
            let out = output::render_list(
                &global.output,
                &children,
                |c| ChildRow::new(c, Some(c.id) == active),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ChildrenCommand::Add {
            first_name,
            last_name,
            level,
        } => {
            let child = app
                .identity()
                .add_child(&NewChild {
                    first_name,
                    last_name,
                    level_id: LevelId(level),
                })
                .await?;
            util::report(
                global,
                &format!("Created {} (#{})", child.display_name(), child.id),
            );
            Ok(())
        }

        ChildrenCommand::Switch { id } => {
            let child = app.switch_active_child(ChildId(id)).await?;
            util::report(global, &format!("Active child: {}", child.display_name()));
            Ok(())
        }
    }
}
