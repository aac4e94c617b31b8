// Children endpoints (parent-scoped).

use tracing::debug;

use crate::auth::ParentCredentials;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Child, NewChild};

impl ApiClient {
    /// List the account's learner profiles.
    ///
    /// `GET /enfants`
    pub async fn list_children(&self, parent: &ParentCredentials) -> Result<Vec<Child>, Error> {
        debug!("listing children");
        let children: Option<Vec<Child>> = self.get("enfants", parent.into()).await?;
        Ok(children.unwrap_or_default())
    }

    /// Create a learner profile.
    ///
    /// `POST /enfants`
    pub async fn create_child(
        &self,
        parent: &ParentCredentials,
        child: &NewChild,
    ) -> Result<Child, Error> {
        debug!(first_name = %child.first_name, level = %child.level_id, "creating child");
        self.post("enfants", child, parent.into()).await
    }
}
