// ── Service category catalog ──
//
// The platform's category definitions. A built-in catalog ships with the
// crate; the backend may serve its own list, which is merged over it.
// Immutable once built: merging produces a new catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use staylink_api::models::RemoteCategory;

/// Where a category's services are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CategoryScope {
    /// Provider-run services outside the hotel (laundry, tours, ...).
    Outside,
    /// Services run by the hotel itself (room service, housekeeping, ...).
    InsideHotel,
}

/// Illustrative item shown on a category card. Not bookable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleItem {
    pub name: String,
    pub category: String,
}

impl SampleItem {
    fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub key: String,
    pub name: String,
    pub description: String,
    pub scope: CategoryScope,
    pub sample_items: Vec<SampleItem>,
    /// Vehicle classes (transportation only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vehicle_types: Vec<String>,
    /// Tour formats (tours only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tour_types: Vec<String>,
    /// Listed but not yet offered; cannot be activated.
    pub coming_soon: bool,
}

impl ServiceCategory {
    fn builtin(key: &str, name: &str, description: &str, scope: CategoryScope) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            scope,
            sample_items: Vec::new(),
            vehicle_types: Vec::new(),
            tour_types: Vec::new(),
            coming_soon: false,
        }
    }

    fn items(mut self, items: &[(&str, &str)]) -> Self {
        self.sample_items = items
            .iter()
            .map(|(name, category)| SampleItem::new(name, category))
            .collect();
        self
    }

    fn coming_soon(mut self) -> Self {
        self.coming_soon = true;
        self
    }

    pub fn is_activatable(&self) -> bool {
        !self.coming_soon
    }
}

/// Ordered set of categories, keyed by `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    categories: IndexMap<String, ServiceCategory>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryCatalog {
    pub fn new(categories: impl IntoIterator<Item = ServiceCategory>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| (c.key.clone(), c))
                .collect(),
        }
    }

    /// The catalog the platform ships with.
    pub fn builtin() -> Self {
        use CategoryScope::{InsideHotel, Outside};

        let mut transportation = ServiceCategory::builtin(
            "transportation",
            "Transportation",
            "Airport transfers, car rentals and private drivers",
            Outside,
        )
        .items(&[
            ("Airport transfer", "transfer"),
            ("Full-day car rental", "rental"),
            ("Private driver (4h)", "chauffeur"),
        ]);
        transportation.vehicle_types = ["economy", "comfort", "premium", "suv", "van", "luxury"]
            .map(String::from)
            .to_vec();

        let mut tours = ServiceCategory::builtin(
            "tours",
            "Tours & Activities",
            "Guided city tours, excursions and day trips",
            Outside,
        )
        .items(&[
            ("Old town walking tour", "walking"),
            ("Desert safari", "adventure"),
            ("Museum pass", "cultural"),
        ]);
        tours.tour_types = ["walking", "bus", "boat", "adventure", "cultural", "private"]
            .map(String::from)
            .to_vec();

        Self::new([
            ServiceCategory::builtin(
                "laundry",
                "Laundry",
                "Wash, dry-clean and ironing with hotel pickup",
                Outside,
            )
            .items(&[
                ("Shirt wash & iron", "wash_iron"),
                ("Suit dry cleaning", "dry_cleaning"),
                ("Express same-day", "express"),
            ]),
            transportation,
            tours,
            ServiceCategory::builtin("spa", "Spa & Wellness", "Massages, facials and wellness treatments", Outside)
                .items(&[("Swedish massage", "massage"), ("Hydrating facial", "facial")])
                .coming_soon(),
            ServiceCategory::builtin("dining", "Dining", "Restaurant reservations and food delivery", Outside)
                .items(&[("Chef's tasting menu", "fine_dining")])
                .coming_soon(),
            ServiceCategory::builtin("entertainment", "Entertainment", "Shows, events and nightlife tickets", Outside)
                .coming_soon(),
            ServiceCategory::builtin("shopping", "Shopping", "Personal shopping and delivery", Outside)
                .coming_soon(),
            ServiceCategory::builtin("fitness", "Fitness", "Personal trainers and gym passes", Outside)
                .coming_soon(),
            ServiceCategory::builtin("room-service", "Room Service", "In-room dining around the clock", InsideHotel)
                .items(&[("Club sandwich", "food"), ("Fresh juice", "beverage")]),
            ServiceCategory::builtin(
                "hotel-restaurant",
                "Hotel Restaurant",
                "Table bookings at the hotel's restaurants",
                InsideHotel,
            )
            .items(&[("Breakfast buffet", "breakfast"), ("Dinner table for two", "dinner")]),
            ServiceCategory::builtin(
                "concierge-services",
                "Concierge Services",
                "Reservations, tickets and local recommendations",
                InsideHotel,
            )
            .items(&[("Theatre tickets", "tickets"), ("Restaurant booking", "reservation")]),
            ServiceCategory::builtin(
                "housekeeping-requests",
                "Housekeeping Requests",
                "Extra cleaning, towels and amenities on demand",
                InsideHotel,
            )
            .items(&[("Extra towels", "amenities"), ("Turndown service", "cleaning")]),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&ServiceCategory> {
        self.categories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceCategory> {
        self.categories.values()
    }

    pub fn in_scope(&self, scope: CategoryScope) -> impl Iterator<Item = &ServiceCategory> {
        self.iter().filter(move |c| c.scope == scope)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of `key` in catalog order (used to sort active sets).
    pub fn position(&self, key: &str) -> Option<usize> {
        self.categories.get_index_of(key)
    }

    /// Overlay server-delivered categories onto this catalog.
    ///
    /// Served fields win where present; built-in metadata (scope, vehicle
    /// and tour types) is kept for known keys. Unknown keys are appended
    /// as outside-hotel categories.
    pub fn merged_with(&self, served: &[RemoteCategory]) -> Self {
        let mut categories = self.categories.clone();
        for remote in served {
            let entry = categories
                .entry(remote.key.clone())
                .or_insert_with(|| {
                    ServiceCategory::builtin(&remote.key, &remote.key, "", CategoryScope::Outside)
                });
            if let Some(ref name) = remote.name {
                entry.name.clone_from(name);
            }
            if let Some(ref description) = remote.description {
                entry.description.clone_from(description);
            }
            if !remote.sample_items.is_empty() {
                entry.sample_items = remote
                    .sample_items
                    .iter()
                    .map(|i| SampleItem {
                        name: i.name.clone(),
                        category: i.category.clone().unwrap_or_default(),
                    })
                    .collect();
            }
            entry.coming_soon = remote.coming_soon;
        }
        Self { categories }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use staylink_api::models::RemoteSampleItem;

    #[test]
    fn builtin_covers_outside_and_inside_categories() {
        let catalog = CategoryCatalog::builtin();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.in_scope(CategoryScope::InsideHotel).count(), 4);
        assert!(catalog.get("laundry").unwrap().is_activatable());
        assert!(catalog.get("spa").unwrap().coming_soon);
        assert!(!catalog.get("transportation").unwrap().vehicle_types.is_empty());
    }

    #[test]
    fn merge_overrides_served_fields_and_appends_unknown() {
        let catalog = CategoryCatalog::builtin();
        let merged = catalog.merged_with(&[
            RemoteCategory {
                key: "spa".into(),
                name: Some("Spa".into()),
                description: None,
                coming_soon: false,
                sample_items: vec![],
            },
            RemoteCategory {
                key: "pet-care".into(),
                name: Some("Pet Care".into()),
                description: Some("Dog walking".into()),
                coming_soon: true,
                sample_items: vec![RemoteSampleItem {
                    name: "30 min walk".into(),
                    category: None,
                }],
            },
        ]);

        let spa = merged.get("spa").unwrap();
        assert!(!spa.coming_soon);
        assert_eq!(spa.name, "Spa");
        assert_eq!(spa.description, catalog.get("spa").unwrap().description);

        let pet = merged.get("pet-care").unwrap();
        assert!(pet.coming_soon);
        assert_eq!(merged.position("pet-care"), Some(12));
        assert_eq!(pet.sample_items[0].name, "30 min walk");
    }
}
