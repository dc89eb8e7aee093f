// ── Housekeeping services ──
//
// Hotel-run housekeeping offers, each with a weekly availability schedule.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::schedule::OperatingSchedule;

pub const DEFAULT_HOUSEKEEPING_CATEGORY: &str = "cleaning";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Master switch; when off the schedule is kept but not offered.
    pub is_available: bool,
    pub schedule: OperatingSchedule,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            is_available: true,
            schedule: OperatingSchedule::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousekeepingService {
    /// Assigned by the backend on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub is_active: bool,
    pub availability: Availability,
}

impl HousekeepingService {
    pub fn new(name: impl Into<String>, base_price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            category: DEFAULT_HOUSEKEEPING_CATEGORY.into(),
            base_price,
            currency: None,
            is_active: true,
            availability: Availability::default(),
        }
    }

    /// One-line availability for listings.
    pub fn schedule_summary(&self) -> String {
        if self.availability.is_available {
            self.availability.schedule.summary().to_string()
        } else {
            "Unavailable".into()
        }
    }

    /// Client-side checks run before create/update.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "service name must not be empty".into(),
            });
        }
        if !self.base_price.is_finite() || self.base_price < 0.0 {
            return Err(CoreError::ValidationFailed {
                message: format!("invalid base price {}", self.base_price),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_defaults_to_weekday_hours() {
        let service = HousekeepingService::new("Deep clean", 40.0);
        assert_eq!(service.schedule_summary(), "Mon-Fri: 09:00 - 17:00");
        assert!(service.validate().is_ok());
    }

    #[test]
    fn unavailable_service_hides_schedule() {
        let mut service = HousekeepingService::new("Turndown", 0.0);
        service.availability.is_available = false;
        assert_eq!(service.schedule_summary(), "Unavailable");
    }

    #[test]
    fn validation_rejects_blank_name_and_negative_price() {
        assert!(HousekeepingService::new("  ", 10.0).validate().is_err());
        assert!(HousekeepingService::new("Ironing", -1.0).validate().is_err());
        assert!(HousekeepingService::new("Ironing", f64::NAN).validate().is_err());
    }
}
