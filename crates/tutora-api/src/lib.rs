// tutora-api: Async Rust client for the Tutora learning platform REST API

pub mod auth;
pub mod client;
mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AuthScope, ChildCredentials, Credentials, ParentCredentials};
pub use client::ApiClient;
pub use error::Error;
pub use models::*;
pub use transport::{TlsMode, TransportConfig};
