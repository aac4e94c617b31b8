// ── Tutora facade ──
//
// Wires the workflows to one API client, one shared state and one
// durable store. Cheaply cloneable.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use tutora_api::{
    ApiClient, CartItem, CartTarget, Child, ChildId, MeetingId, RegisterRequest, SaleId, SlotId,
};

use crate::cart::CartSynchronizer;
use crate::catalog::SessionCatalog;
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::identity::IdentityContext;
use crate::ledger::FavoritesLedger;
use crate::reservation::{ReservationOutcome, ReservationWorkflow};
use crate::state::{AppState, ApplicationPhase, IdentitySnapshot};
use crate::storage::KeyValueStore;

/// Result of reserving a session and mirroring it into the cart.
#[derive(Debug)]
pub struct Booking {
    pub outcome: ReservationOutcome,
    /// The refreshed cart, or why the automatic add failed. The
    /// reservation itself stands either way.
    pub cart: Result<Arc<Vec<CartItem>>, CoreError>,
}

/// The main entry point for front ends.
#[derive(Clone)]
pub struct Tutora {
    inner: Arc<TutoraInner>,
}

struct TutoraInner {
    api: ApiClient,
    state: Arc<AppState>,
    identity: IdentityContext,
    catalog: SessionCatalog,
    reservations: ReservationWorkflow,
    cart: CartSynchronizer,
    ledger: FavoritesLedger,
}

impl Tutora {
    /// Build a client for `config`. Nothing is sent until a workflow runs.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.api_url.as_str(), &config.transport())?;
        Ok(Self::with_api(api, store))
    }

    /// Build around an existing API client.
    pub fn with_api(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let state = Arc::new(AppState::new());
        let catalog = SessionCatalog::new(api.clone(), Arc::clone(&state));

        Self {
            inner: Arc::new(TutoraInner {
                identity: IdentityContext::new(api.clone(), Arc::clone(&state), store),
                reservations: ReservationWorkflow::new(
                    api.clone(),
                    Arc::clone(&state),
                    catalog.clone(),
                ),
                cart: CartSynchronizer::new(api.clone(), Arc::clone(&state)),
                ledger: FavoritesLedger::new(api.clone(), Arc::clone(&state)),
                catalog,
                state,
                api,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.inner.state
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.inner.identity
    }

    pub fn catalog(&self) -> &SessionCatalog {
        &self.inner.catalog
    }

    pub fn reservations(&self) -> &ReservationWorkflow {
        &self.inner.reservations
    }

    pub fn cart(&self) -> &CartSynchronizer {
        &self.inner.cart
    }

    pub fn ledger(&self) -> &FavoritesLedger {
        &self.inner.ledger
    }

    // ── Identity lifecycle ───────────────────────────────────────────

    /// Sign in. Child-scoped data is dropped whenever the identity was
    /// replaced, including when the children fetch after sign-in fails.
    pub async fn login(
        &self,
        mobile: &str,
        password: &SecretString,
    ) -> Result<ApplicationPhase, CoreError> {
        let before = self.inner.state.identity();
        let result = self.inner.identity.login(mobile, password).await;
        self.reset_if_identity_changed(&before);
        result
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<ApplicationPhase, CoreError> {
        let before = self.inner.state.identity();
        let result = self.inner.identity.register(request).await;
        self.reset_if_identity_changed(&before);
        result
    }

    pub async fn restore_session(&self) -> ApplicationPhase {
        self.inner.identity.restore_session().await
    }

    /// Sign out and drop everything cached for the previous account.
    pub fn logout(&self) {
        self.inner.identity.logout();
        self.reset_child_scoped();
    }

    /// Switch the active child, then load that child's cart.
    ///
    /// The previous child's cart and favorites are dropped even if the
    /// cart refresh fails.
    pub async fn switch_active_child(&self, child_id: ChildId) -> Result<Child, CoreError> {
        let child = self.inner.identity.switch_active_child(child_id).await?;
        self.reset_child_scoped();
        if let Err(e) = self.inner.cart.fetch_cart().await {
            warn!(child = %child.id, error = %e, "cart refresh after switch failed");
        }
        Ok(child)
    }

    // ── Booking ──────────────────────────────────────────────────────

    /// Reserve a session and add it to the cart exactly once.
    pub async fn reserve_and_add_to_cart(
        &self,
        meeting_id: MeetingId,
        slot_id: Option<SlotId>,
        known_sale: Option<SaleId>,
    ) -> Result<Booking, CoreError> {
        let session = self.inner.catalog.locate_session(meeting_id).await?;
        let outcome = self
            .inner
            .reservations
            .reserve(&session, slot_id, known_sale)
            .await?;

        let cart = match self
            .inner
            .reservations
            .acknowledge_success_for(outcome.reservation.id)
        {
            Some(reservation) => {
                self.inner
                    .cart
                    .add_to_cart(CartTarget::Meeting(reservation.meeting_id))
                    .await
            }
            None => Ok(self.inner.cart.snapshot()),
        };
        if let Err(ref e) = cart {
            warn!(meeting = %meeting_id, error = %e, "reserved but not added to cart");
        } else {
            info!(meeting = %meeting_id, "reservation added to cart");
        }

        Ok(Booking { outcome, cart })
    }

    fn reset_if_identity_changed(&self, before: &Arc<IdentitySnapshot>) {
        if !Arc::ptr_eq(before, &self.inner.state.identity()) {
            self.reset_child_scoped();
        }
    }

    fn reset_child_scoped(&self) {
        self.inner.cart.clear_local();
        self.inner.ledger.clear_local();
        self.inner.state.clear_sessions();
    }
}
