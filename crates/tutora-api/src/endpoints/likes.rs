// Favorites endpoints (child-scoped).

use serde_json::json;
use tracing::debug;

use crate::auth::ChildCredentials;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ContentId, FavoriteItem, FavoriteToggleResponse};

impl ApiClient {
    /// Flip the favorite flag server-side and return the new value.
    ///
    /// `POST /likes/favorite/{content_id}`
    pub async fn toggle_favorite(
        &self,
        child: &ChildCredentials,
        content_id: ContentId,
    ) -> Result<bool, Error> {
        debug!(%content_id, "toggling favorite");
        let resp: FavoriteToggleResponse = self
            .post(&format!("likes/favorite/{content_id}"), &json!({}), child.into())
            .await?;
        Ok(resp.is_favorite)
    }

    /// `GET /likes/favorites`
    pub async fn list_favorites(&self, child: &ChildCredentials) -> Result<Vec<FavoriteItem>, Error> {
        debug!("listing favorites");
        let items: Option<Vec<FavoriteItem>> = self.get("likes/favorites", child.into()).await?;
        Ok(items.unwrap_or_default())
    }
}
