// Account endpoints
//
// Login and registration answer with a parent token; switching the active
// child trades the parent token for a child-scoped one.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::auth::{Auth, ChildCredentials, ParentCredentials};
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Child, ChildId, LoginRequest, RegisterRequest, SwitchChildResponse, TokenResponse};

impl ApiClient {
    /// Authenticate the account owner.
    ///
    /// `POST /users/login` with `{ mobile, password }`. A 2xx response
    /// without a `token` field is treated as a failed login.
    pub async fn login(
        &self,
        mobile: &str,
        password: &SecretString,
    ) -> Result<ParentCredentials, Error> {
        debug!(mobile, "logging in");
        let body = LoginRequest {
            mobile,
            password: password.expose_secret(),
        };
        let resp: TokenResponse = self
            .post("users/login", &body, Auth::Anonymous)
            .await
            .map_err(reject_as_auth)?;
        let token = resp.token.filter(|t| !t.is_empty()).ok_or(Error::MissingField("token"))?;
        debug!("login successful");
        Ok(ParentCredentials::new(token))
    }

    /// Create a parent account.
    ///
    /// `POST /users/register`. Answers with a parent token like `login`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ParentCredentials, Error> {
        debug!(mobile = %request.mobile, "registering account");
        let resp: TokenResponse = self.post("users/register", request, Auth::Anonymous).await?;
        let token = resp.token.filter(|t| !t.is_empty()).ok_or(Error::MissingField("token"))?;
        Ok(ParentCredentials::new(token))
    }

    /// Select the active learner profile.
    ///
    /// `POST /users/switch-child` with `{ child_id }` under the parent
    /// token. Returns the child-scoped credential and the canonical child
    /// record. The credential is bound to the id the server returned.
    pub async fn switch_child(
        &self,
        parent: &ParentCredentials,
        child_id: ChildId,
    ) -> Result<(ChildCredentials, Child), Error> {
        debug!(%child_id, "switching active child");
        let resp: SwitchChildResponse = self
            .post("users/switch-child", &json!({ "child_id": child_id }), parent.into())
            .await?;
        let token = resp.token.filter(|t| !t.is_empty()).ok_or(Error::MissingField("token"))?;
        let child = resp.child.ok_or(Error::MissingField("child"))?;
        Ok((ChildCredentials::new(token, child.id), child))
    }
}

/// Login rejections come back as 4xx with a message; surface them as
/// authentication failures.
fn reject_as_auth(err: Error) -> Error {
    match err {
        Error::Api { status, message } if (400..500).contains(&status) => {
            Error::Authentication { message }
        }
        other => other,
    }
}
