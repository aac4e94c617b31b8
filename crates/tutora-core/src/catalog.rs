// ── Session catalog ──
//
// Read-only view of live-tutoring offerings, cached per grade level.
// Server order is preserved as received.

use std::sync::Arc;

use tracing::debug;

use tutora_api::{ApiClient, LevelId, MeetingId, Session};

use crate::error::CoreError;
use crate::state::AppState;

#[derive(Clone)]
pub struct SessionCatalog {
    api: ApiClient,
    state: Arc<AppState>,
}

impl SessionCatalog {
    pub fn new(api: ApiClient, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Fetch the sessions of a level under the child token and cache them.
    ///
    /// An empty list is a valid answer.
    pub async fn fetch_sessions_by_level(
        &self,
        level_id: LevelId,
    ) -> Result<Arc<Vec<Session>>, CoreError> {
        let child = self.state.child_credentials()?;
        let sessions = self.api.list_sessions_by_level(&child, level_id).await?;
        debug!(%level_id, count = sessions.len(), "sessions loaded");
        Ok(self.state.store_sessions(level_id, sessions))
    }

    /// Cached sessions for a level, without a request.
    pub fn cached(&self, level_id: LevelId) -> Option<Arc<Vec<Session>>> {
        self.state.sessions(level_id)
    }

    /// Find a session by id: first in the cache, then in the active child's
    /// own level.
    pub async fn locate_session(&self, meeting_id: MeetingId) -> Result<Session, CoreError> {
        if let Some(session) = self.state.find_session(meeting_id) {
            return Ok(session);
        }

        let level_id = self
            .state
            .active_child()
            .and_then(|c| c.level_id)
            .ok_or_else(|| {
                CoreError::validation(format!(
                    "Session {meeting_id} is not loaded and the active child has no level"
                ))
            })?;

        self.fetch_sessions_by_level(level_id)
            .await?
            .iter()
            .find(|s| s.id == meeting_id)
            .cloned()
            .ok_or_else(|| CoreError::validation(format!("Unknown session {meeting_id}")))
    }
}
