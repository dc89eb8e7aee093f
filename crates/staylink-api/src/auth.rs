use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::debug;

/// Which dashboard a session belongs to.
///
/// The backend scopes every endpoint by role; the client only uses it to
/// decide which operations are worth offering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Role {
    Guest,
    HotelAdmin,
    SuperHotelAdmin,
    ServiceProvider,
    SuperAdmin,
}

/// An authenticated session: bearer token plus the tenant it is scoped to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub role: Role,
    pub hotel_id: Option<String>,
    pub provider_id: Option<String>,
}

impl Session {
    pub fn new(token: SecretString, role: Role) -> Self {
        Self {
            token,
            role,
            hotel_id: None,
            provider_id: None,
        }
    }

    pub fn with_hotel(mut self, hotel_id: impl Into<String>) -> Self {
        self.hotel_id = Some(hotel_id.into());
        self
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// `Authorization` header value.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// Shared, observable holder for the current session.
///
/// Cheaply cloneable. The HTTP client reads the token from here on every
/// request and clears it when the backend answers 401, so any view holding
/// a receiver sees the logout without polling.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    tx: Arc<watch::Sender<Option<Arc<Session>>>>,
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::empty()
    }
}

impl SessionSlot {
    pub fn empty() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn with_session(session: Session) -> Self {
        let slot = Self::empty();
        slot.install(session);
        slot
    }

    /// Replace the current session.
    pub fn install(&self, session: Session) {
        debug!(role = %session.role, "installing session");
        self.tx.send_replace(Some(Arc::new(session)));
    }

    /// Drop the current session. Returns `true` if one was present.
    pub fn clear(&self) -> bool {
        let previous = self.tx.send_replace(None);
        if previous.is_some() {
            debug!("session cleared");
        }
        previous.is_some()
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.tx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Session>>> {
        self.tx.subscribe()
    }
}
