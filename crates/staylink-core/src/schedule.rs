// ── Weekly operating schedules ──
//
// Seven days, each open or closed with a start and end time, plus the
// compact one-line summary shown in service listings
// ("Mon-Fri: 09:00 - 17:00, Sat: 10:00 - 14:00").

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, TimeDelta};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Days and times ───────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Weekday {
    #[strum(to_string = "monday", serialize = "mon")]
    Monday,
    #[strum(to_string = "tuesday", serialize = "tue")]
    Tuesday,
    #[strum(to_string = "wednesday", serialize = "wed")]
    Wednesday,
    #[strum(to_string = "thursday", serialize = "thu")]
    Thursday,
    #[strum(to_string = "friday", serialize = "fri")]
    Friday,
    #[strum(to_string = "saturday", serialize = "sat")]
    Saturday,
    #[strum(to_string = "sunday", serialize = "sun")]
    Sunday,
}

impl Weekday {
    /// Week order, Monday first.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }
}

/// Wall-clock time of day, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    const FORMAT: &'static str = "%H:%M";

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    fn on_the_hour(hour: i64) -> Self {
        Self(NaiveTime::MIN + TimeDelta::hours(hour))
    }
}

impl FromStr for ClockTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), Self::FORMAT).map(Self)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── Schedule ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub is_available: bool,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl DaySchedule {
    pub fn open(start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            is_available: true,
            start_time,
            end_time,
        }
    }

    pub fn closed() -> Self {
        Self {
            is_available: false,
            ..Self::default()
        }
    }

    fn same_hours(&self, other: &Self) -> bool {
        self.start_time == other.start_time && self.end_time == other.end_time
    }
}

impl Default for DaySchedule {
    /// Closed, with 09:00 - 17:00 ready for when it opens.
    fn default() -> Self {
        Self {
            is_available: false,
            start_time: ClockTime::on_the_hour(9),
            end_time: ClockTime::on_the_hour(17),
        }
    }
}

/// One field of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdit {
    Available(bool),
    Start(ClockTime),
    End(ClockTime),
}

/// Availability for each day of the week. Serialized as a
/// `monday..sunday` map in week order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "IndexMap<Weekday, DaySchedule>",
    from = "IndexMap<Weekday, DaySchedule>"
)]
pub struct OperatingSchedule {
    days: [DaySchedule; 7],
}

impl Default for OperatingSchedule {
    /// Monday to Friday, 09:00 - 17:00.
    fn default() -> Self {
        let mut days = [DaySchedule::closed(); 7];
        for day in &mut days[..5] {
            day.is_available = true;
        }
        Self { days }
    }
}

impl From<IndexMap<Weekday, DaySchedule>> for OperatingSchedule {
    /// Days missing from the map are closed.
    fn from(map: IndexMap<Weekday, DaySchedule>) -> Self {
        let mut schedule = Self::closed();
        for (day, entry) in map {
            schedule.days[day.index()] = entry;
        }
        schedule
    }
}

impl From<OperatingSchedule> for IndexMap<Weekday, DaySchedule> {
    fn from(schedule: OperatingSchedule) -> Self {
        schedule.iter().map(|(d, s)| (d, *s)).collect()
    }
}

impl OperatingSchedule {
    pub fn closed() -> Self {
        Self {
            days: [DaySchedule::closed(); 7],
        }
    }

    /// Every day open with the same hours.
    pub fn daily(start_time: ClockTime, end_time: ClockTime) -> Self {
        Self {
            days: [DaySchedule::open(start_time, end_time); 7],
        }
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        Weekday::ALL.into_iter().zip(self.days.iter())
    }

    pub fn set_day(&mut self, day: Weekday, edit: DayEdit) {
        let entry = &mut self.days[day.index()];
        match edit {
            DayEdit::Available(open) => entry.is_available = open,
            DayEdit::Start(t) => entry.start_time = t,
            DayEdit::End(t) => entry.end_time = t,
        }
    }

    /// Replace a whole day.
    pub fn set(&mut self, day: Weekday, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    /// Copy `source` onto all seven days.
    pub fn apply_to_all_days(&mut self, source: Weekday) {
        let template = self.days[source.index()];
        self.days = [template; 7];
    }

    pub fn open_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_available).count()
    }

    /// Open days whose start is not before their end. Advisory only:
    /// such schedules are stored as given.
    pub fn inverted_days(&self) -> Vec<Weekday> {
        self.iter()
            .filter(|(_, d)| d.is_available && d.start_time >= d.end_time)
            .map(|(day, _)| day)
            .collect()
    }

    pub fn summary(&self) -> ScheduleSummary<'_> {
        summarize(self)
    }
}

// ── Summary ──────────────────────────────────────────────────────

/// A run of open days sharing the same hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleGroup {
    pub first: Weekday,
    pub last: Weekday,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl ScheduleGroup {
    /// `"Mon-Fri"` for a range, `"Sat"` for a single day.
    pub fn label(&self) -> String {
        if self.first == self.last {
            self.first.abbrev().to_owned()
        } else {
            format!("{}-{}", self.first.abbrev(), self.last.abbrev())
        }
    }
}

impl fmt::Display for ScheduleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.label(), self.start_time, self.end_time)
    }
}

/// Compact view of a schedule. Cheap to build; [`groups`](Self::groups)
/// can be iterated any number of times.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSummary<'a> {
    schedule: &'a OperatingSchedule,
}

pub fn summarize(schedule: &OperatingSchedule) -> ScheduleSummary<'_> {
    ScheduleSummary { schedule }
}

impl<'a> ScheduleSummary<'a> {
    pub fn groups(&self) -> Groups<'a> {
        Groups {
            days: &self.schedule.days,
            next: 0,
        }
    }
}

impl fmt::Display for ScheduleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups = self.groups();
        let Some(first) = groups.next() else {
            return f.write_str("Closed");
        };
        if self.schedule.open_days() == 7 && groups.clone().next().is_none() {
            return write!(f, "Daily: {} - {}", first.start_time, first.end_time);
        }
        write!(f, "{first}")?;
        for group in groups {
            write!(f, ", {group}")?;
        }
        Ok(())
    }
}

/// Iterator over [`ScheduleGroup`]s in week order.
///
/// Closed days are skipped entirely, so open days with equal hours on
/// either side of a closed day fall into the same group.
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    days: &'a [DaySchedule; 7],
    next: usize,
}

impl Groups<'_> {
    fn next_open(&self, from: usize) -> Option<usize> {
        (from..7).find(|&i| self.days[i].is_available)
    }
}

impl Iterator for Groups<'_> {
    type Item = ScheduleGroup;

    fn next(&mut self) -> Option<ScheduleGroup> {
        let first = self.next_open(self.next)?;
        let hours = self.days[first];
        let mut last = first;
        while let Some(candidate) = self.next_open(last + 1) {
            if !self.days[candidate].same_hours(&hours) {
                break;
            }
            last = candidate;
        }
        self.next = last + 1;
        Some(ScheduleGroup {
            first: Weekday::ALL[first],
            last: Weekday::ALL[last],
            start_time: hours.start_time,
            end_time: hours.end_time,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn all_week_same_hours_is_daily() {
        let schedule = OperatingSchedule::daily(t("09:00"), t("17:00"));
        assert_eq!(schedule.summary().to_string(), "Daily: 09:00 - 17:00");
    }

    #[test]
    fn weekdays_only_is_single_range() {
        let schedule = OperatingSchedule::default();
        assert_eq!(schedule.summary().to_string(), "Mon-Fri: 09:00 - 17:00");
    }

    #[test]
    fn differing_hours_split_groups() {
        let mut schedule = OperatingSchedule::default();
        schedule.set(Weekday::Saturday, DaySchedule::open(t("10:00"), t("14:00")));
        schedule.set_day(Weekday::Friday, DayEdit::End(t("15:30")));

        assert_eq!(
            schedule.summary().to_string(),
            "Mon-Thu: 09:00 - 17:00, Fri: 09:00 - 15:30, Sat: 10:00 - 14:00"
        );
    }

    #[test]
    fn closed_days_are_skipped_when_grouping() {
        let mut schedule = OperatingSchedule::closed();
        schedule.set(Weekday::Monday, DaySchedule::open(t("08:00"), t("12:00")));
        schedule.set(Weekday::Wednesday, DaySchedule::open(t("08:00"), t("12:00")));

        let groups: Vec<String> = schedule.summary().groups().map(|g| g.label()).collect();
        assert_eq!(groups, vec!["Mon-Wed"]);
    }

    #[test]
    fn nothing_open_is_closed() {
        assert_eq!(OperatingSchedule::closed().summary().to_string(), "Closed");
    }

    #[test]
    fn group_labels_render_one_per_run() {
        let mut schedule = OperatingSchedule::default();
        schedule.set(Weekday::Sunday, DaySchedule::open(t("11:00"), t("15:00")));
        schedule.set_day(Weekday::Wednesday, DayEdit::Start(t("12:00")));

        let lines: Vec<String> = schedule
            .summary()
            .groups()
            .map(|g| g.to_string())
            .collect();
        insta::assert_snapshot!(lines.join("\n"), @r"
        Mon-Tue: 09:00 - 17:00
        Wed: 12:00 - 17:00
        Thu-Fri: 09:00 - 17:00
        Sun: 11:00 - 15:00
        ");
    }

    #[test]
    fn seven_open_days_with_two_hour_sets_is_not_daily() {
        let mut schedule = OperatingSchedule::daily(t("09:00"), t("17:00"));
        schedule.set_day(Weekday::Sunday, DayEdit::Start(t("11:00")));
        assert_eq!(
            schedule.summary().to_string(),
            "Mon-Sat: 09:00 - 17:00, Sun: 11:00 - 17:00"
        );
    }

    #[test]
    fn groups_are_restartable() {
        let schedule = OperatingSchedule::default();
        let summary = schedule.summary();
        assert_eq!(summary.groups().count(), 1);
        assert_eq!(summary.groups().count(), 1);
    }

    #[test]
    fn apply_to_all_days_copies_source() {
        let mut schedule = OperatingSchedule::default();
        schedule.set_day(Weekday::Monday, DayEdit::Start(t("07:00")));
        schedule.apply_to_all_days(Weekday::Monday);
        assert_eq!(schedule.open_days(), 7);
        assert_eq!(schedule.day(Weekday::Sunday).start_time, t("07:00"));
    }

    #[test]
    fn inverted_hours_are_reported_not_rejected() {
        let mut schedule = OperatingSchedule::default();
        schedule.set_day(Weekday::Tuesday, DayEdit::End(t("08:00")));
        schedule.set_day(Weekday::Sunday, DayEdit::End(t("08:00")));
        assert_eq!(schedule.inverted_days(), vec![Weekday::Tuesday]);
    }

    #[test]
    fn serializes_as_week_ordered_map() {
        let json = serde_json::to_value(OperatingSchedule::default()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(json["monday"]["startTime"], "09:00");
        assert_eq!(json["sunday"]["isAvailable"], false);

        let back: OperatingSchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, OperatingSchedule::default());
    }

    #[test]
    fn weekday_parses_full_and_short_names() {
        assert_eq!("Mon".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SUNDAY".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert_eq!(Weekday::Friday.to_string(), "friday");
    }
}
