// ── Session context ──
//
// The explicit session shared between the HTTP client and the models.
// The client clears it on 401; everything else reads it through here.

use std::sync::Arc;

use strum::Display;

pub use staylink_api::{Role, Session, SessionSlot};

use crate::error::CoreError;

/// Things a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    /// Activate or deactivate service categories for a provider.
    ManageCategories,
    /// Edit the hotel's markup settings.
    EditMarkup,
    /// Create, edit and delete housekeeping services.
    ManageHousekeeping,
    /// Read a guest's loyalty membership.
    ViewLoyalty,
}

impl Capability {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::ManageCategories => &[Role::ServiceProvider, Role::HotelAdmin, Role::SuperAdmin],
            Self::EditMarkup => &[Role::HotelAdmin, Role::SuperHotelAdmin, Role::SuperAdmin],
            Self::ManageHousekeeping => &[
                Role::ServiceProvider,
                Role::HotelAdmin,
                Role::SuperHotelAdmin,
                Role::SuperAdmin,
            ],
            Self::ViewLoyalty => &[Role::Guest],
        }
    }

    pub fn allows(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Read-side view over the [`SessionSlot`].
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slot: SessionSlot,
}

impl SessionContext {
    pub fn new(slot: SessionSlot) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &SessionSlot {
        &self.slot
    }

    pub fn current(&self) -> Result<Arc<Session>, CoreError> {
        self.slot.current().ok_or(CoreError::NotLoggedIn)
    }

    pub fn role(&self) -> Option<Role> {
        self.slot.current().map(|s| s.role)
    }

    /// Current session, if its role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<Arc<Session>, CoreError> {
        let session = self.current()?;
        if capability.allows(session.role) {
            Ok(session)
        } else {
            Err(CoreError::Forbidden {
                message: format!("A {} session cannot {}", session.role, describe(capability)),
            })
        }
    }

    pub fn provider_id(&self) -> Result<String, CoreError> {
        self.current()?
            .provider_id
            .clone()
            .ok_or(CoreError::MissingSessionScope { field: "provider_id" })
    }

    pub fn hotel_id(&self) -> Result<String, CoreError> {
        self.current()?
            .hotel_id
            .clone()
            .ok_or(CoreError::MissingSessionScope { field: "hotel_id" })
    }

    /// Forget the session (explicit logout).
    pub fn logout(&self) -> bool {
        self.slot.clear()
    }
}

fn describe(capability: Capability) -> &'static str {
    match capability {
        Capability::ManageCategories => "manage service categories",
        Capability::EditMarkup => "edit markup settings",
        Capability::ManageHousekeeping => "manage housekeeping services",
        Capability::ViewLoyalty => "view loyalty membership",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn ctx(role: Role) -> SessionContext {
        SessionContext::new(SessionSlot::with_session(
            Session::new(SecretString::from("t"), role).with_hotel("h-1"),
        ))
    }

    #[test]
    fn require_checks_role() {
        assert!(ctx(Role::HotelAdmin).require(Capability::EditMarkup).is_ok());
        let err = ctx(Role::Guest).require(Capability::EditMarkup).unwrap_err();
        assert_eq!(err.to_string(), "A guest session cannot edit markup settings");
    }

    #[test]
    fn missing_scope_is_reported() {
        let ctx = ctx(Role::ServiceProvider);
        assert_eq!(ctx.hotel_id().unwrap(), "h-1");
        assert!(matches!(
            ctx.provider_id(),
            Err(CoreError::MissingSessionScope { field: "provider_id" })
        ));
    }

    #[test]
    fn empty_slot_is_not_logged_in() {
        let ctx = SessionContext::default();
        assert!(matches!(ctx.current(), Err(CoreError::NotLoggedIn)));
        assert_eq!(ctx.role(), None);
    }
}
