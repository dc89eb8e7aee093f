// staylink-api: Async Rust client for the hotel services marketplace REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod categories;
mod housekeeping;
mod loyalty;
mod markup;

pub use auth::{Role, Session, SessionSlot};
pub use client::MarketplaceClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
