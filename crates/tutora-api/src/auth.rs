// Bearer credentials.
//
// The platform issues two coexisting tokens: one for the account owner
// (parent) and one scoped to a single learner profile (child). They are
// separate types so that every endpoint states, in its signature, which
// one it accepts.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::models::ChildId;

/// Which credential a call is authorized with.
///
/// Marker enum (no data) -- the secret material lives in [`Credentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuthScope {
    /// Account-level operations: children, payment info.
    Parent,
    /// Learning-content operations: sessions, reservations, cart, favorites.
    Child,
}

/// Account owner credential.
#[derive(Clone)]
pub struct ParentCredentials {
    token: SecretString,
}

impl ParentCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

impl fmt::Debug for ParentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentCredentials").finish_non_exhaustive()
    }
}

/// Learner credential. The token is only valid for `child_id`, so the two
/// always travel together.
#[derive(Clone)]
pub struct ChildCredentials {
    token: SecretString,
    child_id: ChildId,
}

impl ChildCredentials {
    pub fn new(token: impl Into<String>, child_id: ChildId) -> Self {
        Self {
            token: SecretString::from(token.into()),
            child_id,
        }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn child_id(&self) -> ChildId {
        self.child_id
    }
}

impl fmt::Debug for ChildCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildCredentials")
            .field("child_id", &self.child_id)
            .finish_non_exhaustive()
    }
}

/// Either credential, tagged by scope.
#[derive(Debug, Clone)]
pub enum Credentials {
    Parent(ParentCredentials),
    Child(ChildCredentials),
}

impl Credentials {
    pub fn scope(&self) -> AuthScope {
        match self {
            Self::Parent(_) => AuthScope::Parent,
            Self::Child(_) => AuthScope::Child,
        }
    }

    pub(crate) fn bearer(&self) -> &SecretString {
        match self {
            Self::Parent(p) => p.token(),
            Self::Child(c) => c.token(),
        }
    }
}

impl From<ParentCredentials> for Credentials {
    fn from(p: ParentCredentials) -> Self {
        Self::Parent(p)
    }
}

impl From<ChildCredentials> for Credentials {
    fn from(c: ChildCredentials) -> Self {
        Self::Child(c)
    }
}

/// Request authorization as seen by the transport layer.
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    Anonymous,
    Bearer(&'a SecretString),
}

impl<'a> Auth<'a> {
    pub(crate) fn apply(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Anonymous => builder,
            Self::Bearer(token) => builder.bearer_auth(token.expose_secret()),
        }
    }
}

impl<'a> From<&'a ParentCredentials> for Auth<'a> {
    fn from(p: &'a ParentCredentials) -> Self {
        Self::Bearer(p.token())
    }
}

impl<'a> From<&'a ChildCredentials> for Auth<'a> {
    fn from(c: &'a ChildCredentials) -> Self {
        Self::Bearer(c.token())
    }
}

impl<'a> From<&'a Credentials> for Auth<'a> {
    fn from(c: &'a Credentials) -> Self {
        Self::Bearer(c.bearer())
    }
}
