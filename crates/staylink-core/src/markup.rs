// ── Markup pricing ──
//
// Hotel-side markup on provider prices. Each category has a default
// percentage and optional per-provider overrides. Edits are local until
// `save_all` persists the whole set in one request.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use staylink_api::models::{MarkupSettingRecord, ProviderMarkupRecord};

use crate::error::CoreError;
use crate::gateway::MarkupGateway;

/// Clamp a percentage into `[0, 100]`. NaN becomes 0.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Markup configuration for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupSetting {
    pub category_id: String,
    pub default_markup_percent: f64,
    /// Provider id → custom percentage. Absent means "inherit default".
    #[serde(default)]
    pub provider_overrides: BTreeMap<String, f64>,
}

impl MarkupSetting {
    pub fn new(category_id: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            default_markup_percent: 0.0,
            provider_overrides: BTreeMap::new(),
        }
    }

    pub fn effective_markup(&self, provider_id: &str) -> f64 {
        self.provider_overrides
            .get(provider_id)
            .copied()
            .unwrap_or(self.default_markup_percent)
    }
}

impl From<&MarkupSettingRecord> for MarkupSetting {
    fn from(record: &MarkupSettingRecord) -> Self {
        Self {
            category_id: record.category_id.clone(),
            default_markup_percent: clamp_percent(record.markup_percentage),
            provider_overrides: record
                .providers
                .iter()
                .filter_map(|p| p.custom_markup.map(|m| (p.provider_id.clone(), clamp_percent(m))))
                .collect(),
        }
    }
}

impl From<&MarkupSetting> for MarkupSettingRecord {
    fn from(setting: &MarkupSetting) -> Self {
        Self {
            category_id: setting.category_id.clone(),
            markup_percentage: setting.default_markup_percent,
            providers: setting
                .provider_overrides
                .iter()
                .map(|(provider_id, markup)| ProviderMarkupRecord {
                    provider_id: provider_id.clone(),
                    custom_markup: Some(*markup),
                })
                .collect(),
        }
    }
}

/// Locally edited markup settings for one hotel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupEngine {
    settings: IndexMap<String, MarkupSetting>,
    dirty: bool,
}

impl MarkupEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[MarkupSettingRecord]) -> Self {
        Self {
            settings: records
                .iter()
                .map(|r| (r.category_id.clone(), MarkupSetting::from(r)))
                .collect(),
            dirty: false,
        }
    }

    pub fn to_records(&self) -> Vec<MarkupSettingRecord> {
        self.settings.values().map(MarkupSettingRecord::from).collect()
    }

    /// Fetch the hotel's settings (`GET /hotel/markup-settings`).
    pub async fn load<G: MarkupGateway>(gateway: &G) -> Result<Self, CoreError> {
        let records = gateway.load().await?;
        debug!(categories = records.len(), "loaded markup settings");
        Ok(Self::from_records(&records))
    }

    /// Persist every default and override in one request.
    ///
    /// All-or-nothing: on failure local edits are kept and stay dirty.
    pub async fn save_all<G: MarkupGateway>(&mut self, gateway: &G) -> Result<(), CoreError> {
        let saved = gateway.save_all(&self.to_records()).await?;
        *self = Self::from_records(&saved);
        info!(categories = self.settings.len(), "saved markup settings");
        Ok(())
    }

    // ── Edits ────────────────────────────────────────────────────

    /// Set a category's default markup. Returns the stored (clamped) value.
    pub fn set_default_markup(&mut self, category_id: &str, percent: f64) -> f64 {
        let stored = clamp_percent(percent);
        self.entry(category_id).default_markup_percent = stored;
        self.dirty = true;
        stored
    }

    /// Set or clear (`None`) a provider's override for a category.
    pub fn set_provider_override(
        &mut self,
        category_id: &str,
        provider_id: &str,
        percent: Option<f64>,
    ) -> Option<f64> {
        let setting = self.entry(category_id);
        let stored = percent.map(clamp_percent);
        match stored {
            Some(p) => {
                setting.provider_overrides.insert(provider_id.to_owned(), p);
            }
            None => {
                setting.provider_overrides.remove(provider_id);
            }
        }
        self.dirty = true;
        stored
    }

    fn entry(&mut self, category_id: &str) -> &mut MarkupSetting {
        self.settings
            .entry(category_id.to_owned())
            .or_insert_with(|| MarkupSetting::new(category_id))
    }

    // ── Pricing ──────────────────────────────────────────────────

    pub fn get(&self, category_id: &str) -> Option<&MarkupSetting> {
        self.settings.get(category_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkupSetting> {
        self.settings.values()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Markup in effect for a provider; 0 for unconfigured categories.
    pub fn effective_markup(&self, category_id: &str, provider_id: &str) -> f64 {
        self.settings
            .get(category_id)
            .map_or(0.0, |s| s.effective_markup(provider_id))
    }

    /// Guest-facing price: `base * (1 + markup / 100)`.
    pub fn compute_final_price(&self, base_price: f64, category_id: &str, provider_id: &str) -> f64 {
        base_price + self.markup_amount(base_price, category_id, provider_id)
    }

    /// The hotel's share of the final price.
    pub fn markup_amount(&self, base_price: f64, category_id: &str, provider_id: &str) -> f64 {
        base_price * (self.effective_markup(category_id, provider_id) / 100.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn setters_clamp_silently() {
        let mut engine = MarkupEngine::new();
        assert_eq!(engine.set_default_markup("laundry", 150.0), 100.0);
        assert_eq!(engine.set_default_markup("laundry", -5.0), 0.0);
        assert_eq!(engine.set_default_markup("laundry", f64::NAN), 0.0);
        assert_eq!(
            engine.set_provider_override("laundry", "p-1", Some(250.0)),
            Some(100.0)
        );
        assert!(engine.is_dirty());
    }

    #[test]
    fn override_wins_and_clearing_inherits_default() {
        let mut engine = MarkupEngine::new();
        engine.set_default_markup("laundry", 10.0);
        engine.set_provider_override("laundry", "p-1", Some(25.0));

        assert_eq!(engine.compute_final_price(100.0, "laundry", "p-1"), 125.0);
        assert_eq!(engine.compute_final_price(100.0, "laundry", "p-2"), 110.0);
        assert_eq!(engine.markup_amount(40.0, "laundry", "p-2"), 4.0);

        engine.set_provider_override("laundry", "p-1", None);
        assert_eq!(engine.effective_markup("laundry", "p-1"), 10.0);
    }

    #[test]
    fn final_price_never_below_base() {
        let mut engine = MarkupEngine::new();
        for (i, pct) in [0.0, 0.5, 12.5, 99.9, 100.0].into_iter().enumerate() {
            let key = format!("c{i}");
            engine.set_default_markup(&key, pct);
            for base in [0.0, 1.0, 19.99, 1234.5] {
                let price = engine.compute_final_price(base, &key, "p");
                assert!(price >= base, "{price} < {base} at {pct}%");
                assert_eq!(price, engine.compute_final_price(base, &key, "p"));
            }
        }
        assert_eq!(engine.compute_final_price(50.0, "unknown", "p"), 50.0);
    }

    #[test]
    fn records_round_trip_keeps_overrides() {
        let records = vec![MarkupSettingRecord {
            category_id: "tours".into(),
            markup_percentage: 12.0,
            providers: vec![
                ProviderMarkupRecord {
                    provider_id: "p-1".into(),
                    custom_markup: Some(20.0),
                },
                ProviderMarkupRecord {
                    provider_id: "p-2".into(),
                    custom_markup: None,
                },
            ],
        }];

        let engine = MarkupEngine::from_records(&records);
        assert!(!engine.is_dirty());
        assert_eq!(engine.effective_markup("tours", "p-2"), 12.0);

        let back = engine.to_records();
        assert_eq!(back[0].providers.len(), 1);
        assert_eq!(back[0].providers[0].custom_markup, Some(20.0));
    }
}
