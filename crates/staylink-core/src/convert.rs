// ── API-to-domain type conversions ──
//
// Bridges `staylink_api` wire records and `staylink_core` domain types.
// Reads are lenient: unknown weekday keys are ignored and unparseable
// times fall back to the closed-day defaults.

use indexmap::IndexMap;
use tracing::warn;

use staylink_api::models::{AvailabilityRecord, DayRecord, HousekeepingServiceRecord};

use crate::housekeeping::{Availability, DEFAULT_HOUSEKEEPING_CATEGORY, HousekeepingService};
use crate::schedule::{ClockTime, DaySchedule, OperatingSchedule, Weekday};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_time(raw: &str, fallback: ClockTime, day: &str) -> ClockTime {
    raw.parse().unwrap_or_else(|_| {
        warn!(day, raw, "unparseable schedule time; using default");
        fallback
    })
}

// ── Schedules ──────────────────────────────────────────────────────

fn day_from_record(day: &str, record: &DayRecord) -> DaySchedule {
    let defaults = DaySchedule::default();
    DaySchedule {
        is_available: record.is_available,
        start_time: parse_time(&record.start_time, defaults.start_time, day),
        end_time: parse_time(&record.end_time, defaults.end_time, day),
    }
}

impl From<&DaySchedule> for DayRecord {
    fn from(day: &DaySchedule) -> Self {
        Self {
            is_available: day.is_available,
            start_time: day.start_time.to_string(),
            end_time: day.end_time.to_string(),
        }
    }
}

/// Weekday-keyed wire map to a schedule. Missing days are closed.
pub fn schedule_from_records(records: &IndexMap<String, DayRecord>) -> OperatingSchedule {
    let mut schedule = OperatingSchedule::closed();
    for (name, record) in records {
        match name.parse::<Weekday>() {
            Ok(day) => schedule.set(day, day_from_record(name, record)),
            Err(_) => warn!(day = %name, "ignoring unknown weekday in schedule"),
        }
    }
    schedule
}

/// Schedule to the wire map, always all seven days in week order.
pub fn schedule_to_records(schedule: &OperatingSchedule) -> IndexMap<String, DayRecord> {
    schedule
        .iter()
        .map(|(day, entry)| (day.to_string(), DayRecord::from(entry)))
        .collect()
}

// ── Housekeeping ───────────────────────────────────────────────────

impl From<HousekeepingServiceRecord> for HousekeepingService {
    fn from(record: HousekeepingServiceRecord) -> Self {
        let schedule = if record.availability.schedule.is_empty() {
            OperatingSchedule::default()
        } else {
            schedule_from_records(&record.availability.schedule)
        };
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            category: record
                .category
                .unwrap_or_else(|| DEFAULT_HOUSEKEEPING_CATEGORY.into()),
            base_price: record.base_price,
            currency: record.currency,
            is_active: record.is_active,
            availability: Availability {
                is_available: record.availability.is_available,
                schedule,
            },
        }
    }
}

impl From<&HousekeepingService> for HousekeepingServiceRecord {
    fn from(service: &HousekeepingService) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
            description: service.description.clone(),
            category: Some(service.category.clone()),
            base_price: service.base_price,
            currency: service.currency.clone(),
            is_active: service.is_active,
            availability: AvailabilityRecord {
                is_available: service.availability.is_available,
                schedule: schedule_to_records(&service.availability.schedule),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(open: bool, start: &str, end: &str) -> DayRecord {
        DayRecord {
            is_available: open,
            start_time: start.into(),
            end_time: end.into(),
        }
    }

    #[test]
    fn partial_wire_schedule_fills_closed_days() {
        let mut records = IndexMap::new();
        records.insert("saturday".to_string(), day(true, "10:00", "14:00"));
        records.insert("funday".to_string(), day(true, "00:00", "23:59"));
        records.insert("monday".to_string(), day(true, "8:00", "bogus"));

        let schedule = schedule_from_records(&records);

        assert_eq!(schedule.open_days(), 2);
        let monday = schedule.day(Weekday::Monday);
        assert_eq!(monday.start_time.to_string(), "08:00");
        assert_eq!(monday.end_time.to_string(), "17:00");
        assert_eq!(schedule.summary().to_string(), "Mon: 08:00 - 17:00, Sat: 10:00 - 14:00");
    }

    #[test]
    fn domain_to_wire_writes_all_days() {
        let service = HousekeepingService::new("Deep clean", 40.0);
        let record = HousekeepingServiceRecord::from(&service);

        let keys: Vec<&str> = record.availability.schedule.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"]
        );
        assert_eq!(record.category.as_deref(), Some("cleaning"));
        assert!(!record.availability.schedule["sunday"].is_available);
    }

    #[test]
    fn record_without_schedule_gets_default_week() {
        let record = HousekeepingServiceRecord {
            id: Some("hk-1".into()),
            name: "Towels".into(),
            description: None,
            category: None,
            base_price: 5.0,
            currency: Some("USD".into()),
            is_active: true,
            availability: AvailabilityRecord {
                is_available: true,
                schedule: IndexMap::new(),
            },
        };

        let service = HousekeepingService::from(record);
        assert_eq!(service.schedule_summary(), "Mon-Fri: 09:00 - 17:00");
    }
}
