// ── Cart synchronizer ──
//
// The server's cart is the source of truth. Every mutation is followed by
// a full re-fetch, and the local snapshot is only ever replaced by what
// the server returned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tutora_api::{ApiClient, CartItem, CartItemId, CartTarget, CheckoutReceipt};

use crate::error::CoreError;
use crate::state::AppState;

#[derive(Clone)]
pub struct CartSynchronizer {
    api: ApiClient,
    state: Arc<AppState>,
}

impl CartSynchronizer {
    pub fn new(api: ApiClient, state: Arc<AppState>) -> Self {
        Self { api, state }
    }

    /// Replace the local snapshot with the server's cart.
    pub async fn fetch_cart(&self) -> Result<Arc<Vec<CartItem>>, CoreError> {
        let child = self.state.child_credentials()?;
        let items = self.api.get_cart(&child).await?;
        debug!(count = items.len(), "cart refreshed");
        self.state.replace_cart(items);
        Ok(self.state.cart())
    }

    pub async fn add_to_cart(&self, target: CartTarget) -> Result<Arc<Vec<CartItem>>, CoreError> {
        let child = self.state.child_credentials()?;
        self.api.add_to_cart(&child, target).await?;
        self.fetch_cart().await
    }

    pub async fn remove_from_cart(
        &self,
        item_id: CartItemId,
    ) -> Result<Arc<Vec<CartItem>>, CoreError> {
        let child = self.state.child_credentials()?;
        self.api.remove_from_cart(&child, item_id).await?;
        self.fetch_cart().await
    }

    /// Pay for the cart.
    ///
    /// Rejected without a request when the local snapshot is empty.
    pub async fn checkout(&self) -> Result<CheckoutReceipt, CoreError> {
        let child = self.state.child_credentials()?;
        if self.state.cart().is_empty() {
            warn!("checkout requested with an empty cart");
            return Err(CoreError::validation("Your cart is empty."));
        }

        let receipt = self.api.checkout(&child).await?;
        info!(sale = ?receipt.sale_id, "checkout complete");
        if let Err(e) = self.fetch_cart().await {
            warn!(error = %e, "cart refresh after checkout failed");
        }
        Ok(receipt)
    }

    pub fn snapshot(&self) -> Arc<Vec<CartItem>> {
        self.state.cart()
    }

    /// Drop the local snapshot. Used when the active child changes.
    pub(crate) fn clear_local(&self) {
        self.state.replace_cart(Vec::new());
    }
}
