// ── Application state ──
//
// Process-wide shared state, passed around as `Arc<AppState>`. Each field
// group has exactly one writing module; the `pub(crate)` setters below are
// only called from that module. Any component may read.
//
// | group                         | writer        |
// |-------------------------------|---------------|
// | identity                      | `identity`    |
// | sessions by level             | `catalog`     |
// | cart                          | `cart`        |
// | favorites, follows            | `ledger`      |
// | reservation phase / success   | `reservation` |

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use tutora_api::{
    CartItem, Child, ChildCredentials, ChildId, ContentId, FavoriteItem, LevelId, MeetingId,
    ParentCredentials, Reservation, ReservationId, Session, TeacherId,
};

use crate::error::CoreError;
use crate::reservation::ReservationPhase;

/// Coarse application phase derived from the identity group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ApplicationPhase {
    Unauthenticated,
    /// Signed in, but the account has no child profile yet.
    NeedsChild,
    HasChildren,
}

/// Everything the Identity Context owns, replaced as one value so readers
/// never observe a child token paired with another child's id.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    pub parent: Option<ParentCredentials>,
    pub child: Option<ChildCredentials>,
    pub active_child: Option<Child>,
    pub children: Vec<Child>,
}

impl IdentitySnapshot {
    pub fn phase(&self) -> ApplicationPhase {
        match (&self.parent, self.children.is_empty()) {
            (None, _) => ApplicationPhase::Unauthenticated,
            (Some(_), true) => ApplicationPhase::NeedsChild,
            (Some(_), false) => ApplicationPhase::HasChildren,
        }
    }

    pub fn active_child_id(&self) -> Option<ChildId> {
        self.child.as_ref().map(ChildCredentials::child_id)
    }
}

/// Shared, observable application state.
pub struct AppState {
    identity: watch::Sender<Arc<IdentitySnapshot>>,
    sessions: DashMap<LevelId, Arc<Vec<Session>>>,
    cart: watch::Sender<Arc<Vec<CartItem>>>,
    favorites: watch::Sender<Arc<Vec<FavoriteItem>>>,
    favorite_flags: DashMap<ContentId, bool>,
    following: DashMap<TeacherId, bool>,
    follower_counts: DashMap<TeacherId, u64>,
    reservation_phase: watch::Sender<ReservationPhase>,
    /// Success event awaiting its single consumer.
    pending_success: watch::Sender<Option<Reservation>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(Arc::new(IdentitySnapshot::default()));
        let (cart, _) = watch::channel(Arc::new(Vec::new()));
        let (favorites, _) = watch::channel(Arc::new(Vec::new()));
        let (reservation_phase, _) = watch::channel(ReservationPhase::Idle);
        let (pending_success, _) = watch::channel(None);

        Self {
            identity,
            sessions: DashMap::new(),
            cart,
            favorites,
            favorite_flags: DashMap::new(),
            following: DashMap::new(),
            follower_counts: DashMap::new(),
            reservation_phase,
            pending_success,
        }
    }

    // ── Identity (read) ──────────────────────────────────────────────

    pub fn identity(&self) -> Arc<IdentitySnapshot> {
        self.identity.borrow().clone()
    }

    pub fn subscribe_identity(&self) -> watch::Receiver<Arc<IdentitySnapshot>> {
        self.identity.subscribe()
    }

    pub fn phase(&self) -> ApplicationPhase {
        self.identity.borrow().phase()
    }

    pub fn parent_credentials(&self) -> Result<ParentCredentials, CoreError> {
        self.identity
            .borrow()
            .parent
            .clone()
            .ok_or(CoreError::NotAuthenticated)
    }

    pub fn child_credentials(&self) -> Result<ChildCredentials, CoreError> {
        let snap = self.identity.borrow();
        if snap.parent.is_none() {
            return Err(CoreError::NotAuthenticated);
        }
        snap.child.clone().ok_or(CoreError::NoActiveChild)
    }

    pub fn active_child_id(&self) -> Result<ChildId, CoreError> {
        self.child_credentials().map(|c| c.child_id())
    }

    pub fn active_child(&self) -> Option<Child> {
        self.identity.borrow().active_child.clone()
    }

    // ── Identity (write: `identity` module only) ─────────────────────

    pub(crate) fn replace_identity(&self, snapshot: IdentitySnapshot) {
        self.identity.send_replace(Arc::new(snapshot));
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub fn sessions(&self, level_id: LevelId) -> Option<Arc<Vec<Session>>> {
        self.sessions.get(&level_id).map(|r| Arc::clone(r.value()))
    }

    /// Look a session up across every cached level.
    pub fn find_session(&self, meeting_id: MeetingId) -> Option<Session> {
        self.sessions
            .iter()
            .find_map(|entry| entry.value().iter().find(|s| s.id == meeting_id).cloned())
    }

    pub(crate) fn store_sessions(&self, level_id: LevelId, sessions: Vec<Session>) -> Arc<Vec<Session>> {
        let sessions = Arc::new(sessions);
        self.sessions.insert(level_id, Arc::clone(&sessions));
        sessions
    }

    pub(crate) fn clear_sessions(&self) {
        self.sessions.clear();
    }

    // ── Cart ─────────────────────────────────────────────────────────

    pub fn cart(&self) -> Arc<Vec<CartItem>> {
        self.cart.borrow().clone()
    }

    pub fn subscribe_cart(&self) -> watch::Receiver<Arc<Vec<CartItem>>> {
        self.cart.subscribe()
    }

    pub(crate) fn replace_cart(&self, items: Vec<CartItem>) {
        self.cart.send_replace(Arc::new(items));
    }

    // ── Favorites & follows ──────────────────────────────────────────

    pub fn favorites(&self) -> Arc<Vec<FavoriteItem>> {
        self.favorites.borrow().clone()
    }

    pub fn subscribe_favorites(&self) -> watch::Receiver<Arc<Vec<FavoriteItem>>> {
        self.favorites.subscribe()
    }

    /// Last server-reported favorite flag. Unknown content is not a favorite.
    pub fn is_favorite(&self, content_id: ContentId) -> bool {
        self.favorite_flags
            .get(&content_id)
            .is_some_and(|flag| *flag.value())
    }

    pub fn is_following(&self, teacher_id: TeacherId) -> Option<bool> {
        self.following.get(&teacher_id).map(|f| *f.value())
    }

    pub fn follower_count(&self, teacher_id: TeacherId) -> Option<u64> {
        self.follower_counts.get(&teacher_id).map(|c| *c.value())
    }

    pub(crate) fn set_favorite_flag(&self, content_id: ContentId, flag: bool) {
        self.favorite_flags.insert(content_id, flag);
    }

    /// Replace the favorites list and rebuild the flag map from it.
    pub(crate) fn replace_favorites(&self, items: Vec<FavoriteItem>) {
        self.favorite_flags.clear();
        for item in &items {
            self.favorite_flags.insert(item.id, true);
        }
        self.favorites.send_replace(Arc::new(items));
    }

    pub(crate) fn set_following(&self, teacher_id: TeacherId, following: bool) {
        self.following.insert(teacher_id, following);
    }

    pub(crate) fn set_follower_count(&self, teacher_id: TeacherId, count: u64) {
        self.follower_counts.insert(teacher_id, count);
    }

    pub(crate) fn clear_ledger(&self) {
        self.favorite_flags.clear();
        self.following.clear();
        self.follower_counts.clear();
        self.favorites.send_replace(Arc::new(Vec::new()));
    }

    // ── Reservation ──────────────────────────────────────────────────

    pub fn reservation_phase(&self) -> ReservationPhase {
        self.reservation_phase.borrow().clone()
    }

    pub fn subscribe_reservation_phase(&self) -> watch::Receiver<ReservationPhase> {
        self.reservation_phase.subscribe()
    }

    pub fn has_pending_success(&self) -> bool {
        self.pending_success.borrow().is_some()
    }

    pub(crate) fn set_reservation_phase(&self, phase: ReservationPhase) {
        self.reservation_phase.send_replace(phase);
    }

    pub(crate) fn publish_success(&self, reservation: Reservation) {
        self.pending_success.send_replace(Some(reservation));
    }

    /// Atomically take the pending success event.
    pub(crate) fn take_success(&self) -> Option<Reservation> {
        self.pending_success.send_replace(None)
    }

    /// Take the pending success event only when it is for `id`.
    pub(crate) fn take_success_if(&self, id: ReservationId) -> Option<Reservation> {
        let mut taken = None;
        self.pending_success.send_if_modified(|pending| {
            if pending.as_ref().is_some_and(|r| r.id == id) {
                taken = pending.take();
                true
            } else {
                false
            }
        });
        taken
    }
}
