//! Favorites and teacher-follow handlers.

use serde::Serialize;

use tutora_core::{ContentId, TeacherId, Tutora};

use crate::cli::{FavoritesArgs, FavoritesCommand, FollowArgs, FollowCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, FavoriteRow};

pub async fn handle(app: &Tutora, args: FavoritesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FavoritesCommand::List => {
            let items = app.ledger().fetch_favorites().await?;
            let out = output::render_list(
                &global.output,
                &items,
                |f| FavoriteRow::from(f),
                |f| f.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FavoritesCommand::Toggle { id } => {
            let favorite = app.ledger().toggle_favorite(ContentId(id)).await?;
            let view = FavoriteFlag { id, favorite };
            let out = output::render_single(
                &global.output,
                &view,
                |v| {
                    if v.favorite {
                        format!("#{} added to favorites", v.id)
                    } else {
                        format!("#{} removed from favorites", v.id)
                    }
                },
                |v| v.favorite.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct FavoriteFlag {
    id: i64,
    favorite: bool,
}

#[derive(Serialize)]
struct FollowView {
    teacher: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    following: Option<bool>,
    followers: u64,
}

pub async fn follow(app: &Tutora, args: FollowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let view = match args.command {
        FollowCommand::Toggle { teacher } => {
            let state = app.ledger().toggle_follow(TeacherId(teacher)).await?;
            FollowView {
                teacher,
                following: Some(state.following),
                followers: state.followers,
            }
        }
        FollowCommand::Count { teacher } => FollowView {
            teacher,
            following: None,
            followers: app.ledger().refresh_follower_count(TeacherId(teacher)).await?,
        },
    };

    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            let relation = match v.following {
                Some(true) => "Following. ",
                Some(false) => "Not following. ",
                None => "",
            };
            format!("{relation}Teacher #{} has {} follower(s)", v.teacher, v.followers)
        },
        |v| v.followers.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
