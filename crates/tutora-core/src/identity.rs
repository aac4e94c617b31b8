// ── Identity Context ──
//
// Sole writer of the parent token, the child token / active child pair,
// and the children list. Every mutation writes durable storage first and
// memory second; a mutation is committed once both are done.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use tutora_api::{
    ApiClient, Child, ChildCredentials, ChildId, NewChild, ParentCredentials, RegisterRequest,
};

use crate::error::CoreError;
use crate::state::{AppState, ApplicationPhase, IdentitySnapshot};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Login, child switching, logout and startup restore.
#[derive(Clone)]
pub struct IdentityContext {
    api: ApiClient,
    state: Arc<AppState>,
    store: Arc<dyn KeyValueStore>,
}

impl IdentityContext {
    pub fn new(api: ApiClient, state: Arc<AppState>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { api, state, store }
    }

    /// Sign the account owner in.
    ///
    /// On failure the previous identity is left untouched. On success the
    /// parent token is committed first; a failing children fetch is then
    /// reported, with the account signed in and no children loaded.
    pub async fn login(
        &self,
        mobile: &str,
        password: &SecretString,
    ) -> Result<ApplicationPhase, CoreError> {
        let parent = self.api.login(mobile, password).await?;
        info!("signed in");
        self.adopt_parent(parent).await
    }

    /// Create an account and sign it in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApplicationPhase, CoreError> {
        let parent = self.api.register(request).await?;
        info!("account registered");
        self.adopt_parent(parent).await
    }

    /// Make `child_id` the active learner profile.
    ///
    /// Nothing is committed until the new child token, the child record and
    /// the refreshed children list have all been received and durably
    /// written. Any failure before that leaves the previous active child in
    /// place, in memory and on disk.
    pub async fn switch_active_child(&self, child_id: ChildId) -> Result<Child, CoreError> {
        let parent = self.state.parent_credentials()?;

        let (child_creds, child) = self.api.switch_child(&parent, child_id).await?;
        if child_creds.child_id() != child_id {
            warn!(requested = %child_id, returned = %child.id, "server switched to a different child");
        }

        // Switching can reorder or relabel children server-side.
        let children = self.api.list_children(&parent).await?;

        let entries = [
            (keys::TOKEN_CHILD, child_creds.token().expose_secret().to_owned()),
            (keys::ACTIVE_CHILD_ID, child.id.to_string()),
            (keys::ACTIVE_CHILD, to_json(&child)?),
            (keys::CHILDREN, to_json(&children)?),
        ];
        persist_all(self.store.as_ref(), &entries)?;

        let current = self.state.identity();
        self.state.replace_identity(IdentitySnapshot {
            parent: current.parent.clone(),
            child: Some(child_creds),
            active_child: Some(child.clone()),
            children,
        });
        info!(child = %child.id, "active child switched");
        Ok(child)
    }

    /// Create a learner profile and refresh the children list.
    pub async fn add_child(&self, new_child: &NewChild) -> Result<Child, CoreError> {
        let parent = self.state.parent_credentials()?;
        let created = self.api.create_child(&parent, new_child).await?;
        debug!(child = %created.id, "child created");
        self.refresh_children().await?;
        Ok(created)
    }

    /// Re-fetch the children list under the parent token and persist it.
    pub async fn refresh_children(&self) -> Result<Vec<Child>, CoreError> {
        let parent = self.state.parent_credentials()?;
        let children = self.api.list_children(&parent).await?;
        self.store.set(keys::CHILDREN, &to_json(&children)?)?;

        let current = self.state.identity();
        self.state.replace_identity(IdentitySnapshot {
            children: children.clone(),
            ..(*current).clone()
        });
        Ok(children)
    }

    /// Forget every credential, locally and durably.
    ///
    /// Storage failures are logged; memory is always reset.
    pub fn logout(&self) {
        for key in keys::ALL {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to clear stored value");
            }
        }
        self.state.replace_identity(IdentitySnapshot::default());
        info!("signed out");
    }

    /// Rebuild the identity from durable storage at startup.
    ///
    /// Never fails: missing or unreadable data leaves the app
    /// unauthenticated, and a failed children fetch leaves the app signed
    /// in without a children list. No request is made when no parent token
    /// is stored.
    pub async fn restore_session(&self) -> ApplicationPhase {
        let token = match self.store.get(keys::TOKEN) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!("no stored session");
                self.state.replace_identity(IdentitySnapshot::default());
                return ApplicationPhase::Unauthenticated;
            }
            Err(e) => {
                warn!(error = %e, "stored session unreadable");
                self.state.replace_identity(IdentitySnapshot::default());
                return ApplicationPhase::Unauthenticated;
            }
        };

        let parent = ParentCredentials::new(token);
        let (child, active_child) = self.restore_child_pair().unzip();
        let mut children = self.read_json::<Vec<Child>>(keys::CHILDREN).unwrap_or_default();

        if children.is_empty() {
            match self.api.list_children(&parent).await {
                Ok(fetched) => {
                    if let Err(e) = to_json(&fetched).and_then(|json| {
                        self.store.set(keys::CHILDREN, &json).map_err(CoreError::from)
                    }) {
                        warn!(error = %e, "failed to cache children list");
                    }
                    children = fetched;
                }
                Err(e) => warn!(error = %e, "children list unavailable; continuing without it"),
            }
        }

        let snapshot = IdentitySnapshot {
            parent: Some(parent),
            child,
            active_child,
            children,
        };
        let phase = snapshot.phase();
        self.state.replace_identity(snapshot);
        info!(%phase, "session restored");
        phase
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Commit a fresh parent token: clears any previous account's child
    /// pair, then loads the children list.
    async fn adopt_parent(&self, parent: ParentCredentials) -> Result<ApplicationPhase, CoreError> {
        replace_parent_token(self.store.as_ref(), parent.token().expose_secret())?;
        self.state.replace_identity(IdentitySnapshot {
            parent: Some(parent),
            ..IdentitySnapshot::default()
        });

        let children = self.refresh_children().await?;
        let phase = self.state.phase();
        debug!(children = children.len(), %phase, "children loaded");
        Ok(phase)
    }

    /// The stored child token, id and record, only when all three are
    /// present and agree.
    fn restore_child_pair(&self) -> Option<(ChildCredentials, Child)> {
        let token = self.store.get(keys::TOKEN_CHILD).ok().flatten()?;
        let id: ChildId = self
            .store
            .get(keys::ACTIVE_CHILD_ID)
            .ok()
            .flatten()?
            .parse()
            .ok()?;
        let child: Child = self.read_json(keys::ACTIVE_CHILD)?;
        if child.id != id || token.is_empty() {
            warn!(stored_id = %id, record_id = %child.id, "stored active child is inconsistent; ignoring");
            return None;
        }
        Some((ChildCredentials::new(token, id), child))
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable stored value");
                None
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string(value).map_err(|e| CoreError::Internal(format!("serialize: {e}")))
}

const CHILD_KEYS: [&str; 4] = [
    keys::TOKEN_CHILD,
    keys::ACTIVE_CHILD_ID,
    keys::ACTIVE_CHILD,
    keys::CHILDREN,
];

fn read_all<'k>(
    store: &dyn KeyValueStore,
    names: impl IntoIterator<Item = &'k str>,
) -> Result<Vec<(&'k str, Option<String>)>, StorageError> {
    names
        .into_iter()
        .map(|k| store.get(k).map(|v| (k, v)))
        .collect()
}

fn restore_all(store: &dyn KeyValueStore, previous: &[(&str, Option<String>)]) {
    for (key, old) in previous {
        let restored = match old {
            Some(v) => store.set(key, v),
            None => store.remove(key),
        };
        if let Err(e) = restored {
            warn!(key, error = %e, "rollback of stored value failed");
        }
    }
}

/// Write all entries, or none: on failure the previous values are written
/// back before the error is returned.
fn persist_all(store: &dyn KeyValueStore, entries: &[(&str, String)]) -> Result<(), StorageError> {
    let previous = read_all(store, entries.iter().map(|(k, _)| *k))?;

    for (written, (key, value)) in entries.iter().enumerate() {
        if let Err(e) = store.set(key, value) {
            restore_all(store, &previous[..written]);
            return Err(e);
        }
    }
    Ok(())
}

/// Drop the stored child pair and children list, then write the parent
/// token. On failure every key is put back, so the store never pairs the
/// new token with the previous account's child.
fn replace_parent_token(store: &dyn KeyValueStore, token: &str) -> Result<(), StorageError> {
    let previous = read_all(store, CHILD_KEYS.into_iter().chain([keys::TOKEN]))?;

    let written = CHILD_KEYS
        .iter()
        .try_for_each(|key| store.remove(key))
        .and_then(|()| store.set(keys::TOKEN, token));
    if let Err(e) = written {
        restore_all(store, &previous);
        return Err(e);
    }
    Ok(())
}
