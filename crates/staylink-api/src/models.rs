// Wire types for the marketplace REST API.
//
// These mirror the backend's camelCase JSON one-to-one. Domain types live
// in `staylink-core`, which converts from these after every fetch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Responses come back either bare or wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// `{ "message": "..." }` acknowledgement for state-changing calls.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw activate/deactivate reply. The message sits at the top level or
/// inside `data`, and either may be absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Acknowledgement {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl Acknowledgement {
    pub(crate) fn into_message(self) -> MessageResponse {
        let nested = self
            .data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        MessageResponse {
            message: self.message.or(nested),
        }
    }
}

/// Error body shape for non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Categories ───────────────────────────────────────────────────────

/// `GET /service/categories` payload (inside the `data` envelope).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    #[serde(default)]
    pub available_categories: Vec<RemoteCategory>,
    #[serde(default)]
    pub active_categories: Vec<CategoryRef>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A category as served by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCategory {
    #[serde(alias = "id")]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub sample_items: Vec<RemoteSampleItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteSampleItem {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Active categories arrive either as plain keys or as small objects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Key(String),
    Entry {
        #[serde(alias = "category", alias = "id")]
        key: String,
    },
}

impl CategoryRef {
    pub fn key(&self) -> &str {
        match self {
            Self::Key(k) | Self::Entry { key: k } => k,
        }
    }
}

/// `GET /service/inside-services` item.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsideService {
    pub id: String,
    #[serde(default)]
    pub is_active: bool,
}

// ── Markup ───────────────────────────────────────────────────────────

/// One category's markup setting, as sent to and returned by
/// `/hotel/markup-settings`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupSettingRecord {
    pub category_id: String,
    pub markup_percentage: f64,
    #[serde(default)]
    pub providers: Vec<ProviderMarkupRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMarkupRecord {
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_markup: Option<f64>,
}

// ── Housekeeping ─────────────────────────────────────────────────────

/// One weekday's availability window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(default)]
    pub is_available: bool,
    #[serde(default = "default_start")]
    pub start_time: String,
    #[serde(default = "default_end")]
    pub end_time: String,
}

fn default_start() -> String {
    "09:00".into()
}
fn default_end() -> String {
    "17:00".into()
}

/// `availability` block of a housekeeping service. Schedule keys are
/// lowercase weekday names; insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub schedule: IndexMap<String, DayRecord>,
}

/// A housekeeping service as stored by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HousekeepingServiceRecord {
    #[serde(alias = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub availability: AvailabilityRecord,
}

fn default_true() -> bool {
    true
}

// ── Loyalty ──────────────────────────────────────────────────────────

/// `GET /guest/loyalty/membership` payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub current_tier: String,
    #[serde(default)]
    pub tier_points: u64,
    #[serde(default)]
    pub available_points: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_refs_accept_strings_and_objects() {
        let listing: CategoryListing = serde_json::from_value(json!({
            "availableCategories": [{ "key": "laundry", "name": "Laundry" }],
            "activeCategories": ["laundry", { "category": "spa" }]
        }))
        .unwrap();

        let keys: Vec<&str> = listing.active_categories.iter().map(CategoryRef::key).collect();
        assert_eq!(keys, ["laundry", "spa"]);
        assert!(!listing.available_categories[0].coming_soon);
    }

    #[test]
    fn wrapped_and_bare_payloads_unwrap_identically() {
        let wrapped: MaybeWrapped<Vec<InsideService>> =
            serde_json::from_value(json!({ "data": [{ "id": "room-service", "isActive": true }] }))
                .unwrap();
        let bare: MaybeWrapped<Vec<InsideService>> =
            serde_json::from_value(json!([{ "id": "room-service", "isActive": true }])).unwrap();

        assert_eq!(wrapped.into_inner()[0].id, "room-service");
        assert!(bare.into_inner()[0].is_active);
    }

    #[test]
    fn provider_override_omits_absent_markup() {
        let record = ProviderMarkupRecord {
            provider_id: "p1".into(),
            custom_markup: None,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "providerId": "p1" })
        );
    }
}
