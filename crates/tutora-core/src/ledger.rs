// ── Favorites / follow ledger ──
//
// Flags and counts come from the server only. A toggle's response
// replaces the local flag, and follower counts are re-read after every
// follow change rather than adjusted locally.

use std::sync::Arc;

use tracing::{debug, info};

use tutora_api::{ApiClient, ContentId, FavoriteItem, TeacherId};

use crate::error::CoreError;
use crate::state::AppState;

/// Follow relation and aggregate count after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub following: bool,
    pub followers: u64,
}

#[derive(Clone)]
pub struct FavoritesLedger {
    api: ApiClient,
    state: Arc<AppState>,
}

impl FavoritesLedger {
    pub fn new(api: ApiClient, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Flip a favorite and return the server's new flag.
    ///
    /// The favorites list is re-fetched afterwards so that removed items
    /// disappear from it.
    pub async fn toggle_favorite(&self, content_id: ContentId) -> Result<bool, CoreError> {
        let child = self.state.child_credentials()?;
        let favorite = self.api.toggle_favorite(&child, content_id).await?;
        self.state.set_favorite_flag(content_id, favorite);
        info!(%content_id, favorite, "favorite toggled");

        self.fetch_favorites().await?;
        // The toggle answer is authoritative for this item even if the
        // list lags behind.
        self.state.set_favorite_flag(content_id, favorite);
        Ok(favorite)
    }

    pub async fn fetch_favorites(&self) -> Result<Arc<Vec<FavoriteItem>>, CoreError> {
        let child = self.state.child_credentials()?;
        let items = self.api.list_favorites(&child).await?;
        debug!(count = items.len(), "favorites refreshed");
        self.state.replace_favorites(items);
        Ok(self.state.favorites())
    }

    /// Follow or unfollow a teacher as the active child.
    ///
    /// Reads the current relation first, then writes its opposite. Two
    /// concurrent toggles may race; the last write wins.
    pub async fn toggle_follow(&self, teacher_id: TeacherId) -> Result<FollowState, CoreError> {
        let follower = self.state.active_child_id()?;

        let currently = self.api.is_following(follower, teacher_id).await?;
        if currently {
            self.api.unfollow(follower, teacher_id).await?;
        } else {
            self.api.follow(follower, teacher_id).await?;
        }
        let following = !currently;
        self.state.set_following(teacher_id, following);
        info!(%teacher_id, following, "follow toggled");

        let followers = self.refresh_follower_count(teacher_id).await?;
        Ok(FollowState {
            following,
            followers,
        })
    }

    /// Current follow relation for the active child, from the server.
    pub async fn refresh_follow_state(&self, teacher_id: TeacherId) -> Result<bool, CoreError> {
        let follower = self.state.active_child_id()?;
        let following = self.api.is_following(follower, teacher_id).await?;
        self.state.set_following(teacher_id, following);
        Ok(following)
    }

    pub async fn refresh_follower_count(&self, teacher_id: TeacherId) -> Result<u64, CoreError> {
        let count = self.api.follower_count(teacher_id).await?;
        self.state.set_follower_count(teacher_id, count);
        Ok(count)
    }

    pub(crate) fn clear_local(&self) {
        self.state.clear_ledger();
    }
}
