// Follow endpoints.
//
// The follower identity is the child id itself; these routes take no
// bearer token.

use tracing::debug;

use crate::auth::Auth;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ChildId, FollowRequest, FollowerCountResponse, IsFollowingResponse, TeacherId};

impl ApiClient {
    /// `GET /follows/is-following/{follower_id}/{teacher_id}`
    pub async fn is_following(
        &self,
        follower_id: ChildId,
        teacher_id: TeacherId,
    ) -> Result<bool, Error> {
        let resp: IsFollowingResponse = self
            .get(
                &format!("follows/is-following/{follower_id}/{teacher_id}"),
                Auth::Anonymous,
            )
            .await?;
        Ok(resp.is_following)
    }

    /// `POST /follows/subscribe`
    pub async fn follow(&self, follower_id: ChildId, teacher_id: TeacherId) -> Result<(), Error> {
        debug!(%follower_id, %teacher_id, "following teacher");
        let body = FollowRequest {
            follower_id,
            teacher_id,
        };
        self.post_no_response("follows/subscribe", &body, Auth::Anonymous)
            .await
    }

    /// `DELETE /follows/unsubscribe`
    pub async fn unfollow(&self, follower_id: ChildId, teacher_id: TeacherId) -> Result<(), Error> {
        debug!(%follower_id, %teacher_id, "unfollowing teacher");
        let body = FollowRequest {
            follower_id,
            teacher_id,
        };
        self.delete("follows/unsubscribe", Some(&body), Auth::Anonymous)
            .await
    }

    /// `GET /follows/count/{teacher_id}`
    pub async fn follower_count(&self, teacher_id: TeacherId) -> Result<u64, Error> {
        let resp: FollowerCountResponse = self
            .get(&format!("follows/count/{teacher_id}"), Auth::Anonymous)
            .await?;
        Ok(resp.count)
    }
}
