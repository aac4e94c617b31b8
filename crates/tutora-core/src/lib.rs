//! Client-side workflows for the Tutora learning platform.
//!
//! Sits between `tutora-api` and front ends (the `tutora` CLI):
//!
//! - **[`Tutora`]**: facade wiring every workflow to one API client, one
//!   [`AppState`] and one [`KeyValueStore`].
//!
//! - **[`IdentityContext`]**: parent and child credentials, child
//!   switching, logout and startup restore. The only writer of identity
//!   state.
//!
//! - **[`SessionCatalog`]** and **[`ReservationWorkflow`]**: sessions by
//!   level, reservation with the single sale-free retry, cancellation.
//!
//! - **[`CartSynchronizer`]** and **[`FavoritesLedger`]**: server-authoritative
//!   cart, favorites and follows.
//!
//! - **[`AppState`]**: shared state published on `tokio::sync::watch`
//!   channels, with one writing module per field group.

pub mod app;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod reservation;
pub mod state;
pub mod storage;

pub use app::{Booking, Tutora};
pub use cart::CartSynchronizer;
pub use catalog::SessionCatalog;
pub use config::ClientConfig;
pub use error::CoreError;
pub use identity::IdentityContext;
pub use ledger::{FavoritesLedger, FollowState};
pub use reservation::{
    ReservationOutcome, ReservationPhase, ReservationWorkflow, is_sale_id_rejection,
};
pub use state::{AppState, ApplicationPhase, IdentitySnapshot};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

// API types front ends need without depending on `tutora-api` directly.
pub use tutora_api::{
    CartItem, CartItemId, CartTarget, CheckoutReceipt, Child, ChildId, ContentId, FavoriteItem,
    LevelId, MeetingId, NewChild, RegisterRequest, Reservation, ReservationId, ReservationStatus,
    SaleId, Session, SessionKind, SlotId, TeacherId, TimeSlot, WebinarId,
};
