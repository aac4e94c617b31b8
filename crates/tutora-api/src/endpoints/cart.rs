// Cart endpoints (child-scoped).

use serde_json::json;
use tracing::debug;

use crate::auth::ChildCredentials;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CartItem, CartItemId, CartTarget, CheckoutReceipt};

impl ApiClient {
    /// `GET /cart`
    pub async fn get_cart(&self, child: &ChildCredentials) -> Result<Vec<CartItem>, Error> {
        debug!("fetching cart");
        let items: Option<Vec<CartItem>> = self.get("cart", child.into()).await?;
        Ok(items.unwrap_or_default())
    }

    /// `POST /cart` with `{ meeting_id }` or `{ webinar_id }`.
    pub async fn add_to_cart(
        &self,
        child: &ChildCredentials,
        target: CartTarget,
    ) -> Result<(), Error> {
        debug!(?target, "adding to cart");
        self.post_no_response("cart", &target.to_body(), child.into())
            .await
    }

    /// `DELETE /cart/{id}`
    pub async fn remove_from_cart(
        &self,
        child: &ChildCredentials,
        item_id: CartItemId,
    ) -> Result<(), Error> {
        debug!(%item_id, "removing from cart");
        self.delete::<()>(&format!("cart/{item_id}"), None, child.into())
            .await
    }

    /// `POST /cart/checkout`
    pub async fn checkout(&self, child: &ChildCredentials) -> Result<CheckoutReceipt, Error> {
        debug!("checking out cart");
        let receipt: Option<CheckoutReceipt> =
            self.post("cart/checkout", &json!({}), child.into()).await?;
        Ok(receipt.unwrap_or_default())
    }
}
