//! Schedule preview handlers and the `--open/--closed/--daily` flag parser
//! shared with housekeeping.

use serde::Serialize;
use tabled::Tabled;

use staylink_core::{ClockTime, DaySchedule, Notice, OperatingSchedule, Weekday};

use crate::cli::{GlobalOpts, ScheduleArgs, ScheduleCommand, ScheduleEdits};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Flag parsing ────────────────────────────────────────────────────

fn parse_day(raw: &str) -> Result<Weekday, CliError> {
    raw.trim().parse().map_err(|_| CliError::Validation {
        field: "day".into(),
        reason: format!("'{raw}' is not a weekday (mon..sun or monday..sunday)"),
    })
}

fn parse_time(raw: &str) -> Result<ClockTime, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "time".into(),
        reason: format!("'{raw}' is not an HH:MM time"),
    })
}

/// `HH:MM-HH:MM`
fn parse_hours(raw: &str) -> Result<(ClockTime, ClockTime), CliError> {
    let (start, end) = raw.split_once('-').ok_or_else(|| CliError::Validation {
        field: "hours".into(),
        reason: format!("expected START-END, got '{raw}'"),
    })?;
    Ok((parse_time(start)?, parse_time(end)?))
}

/// `DAY=HH:MM-HH:MM`
fn parse_open_day(raw: &str) -> Result<(Weekday, ClockTime, ClockTime), CliError> {
    let (day, hours) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "open".into(),
        reason: format!("expected DAY=START-END, got '{raw}'"),
    })?;
    let (start, end) = parse_hours(hours)?;
    Ok((parse_day(day)?, start, end))
}

/// Whether any schedule flag was given.
pub fn has_edits(edits: &ScheduleEdits) -> bool {
    edits.daily.is_some()
        || !edits.open.is_empty()
        || !edits.closed.is_empty()
        || edits.copy_from.is_some()
        || edits.from_file.is_some()
}

/// Apply schedule flags on top of `base` (or on the `--from-file` week).
pub fn apply_edits(
    base: OperatingSchedule,
    edits: &ScheduleEdits,
) -> Result<OperatingSchedule, CliError> {
    let mut schedule = match edits.from_file {
        Some(ref path) => util::read_json_file(path)?,
        None => base,
    };

    if let Some(ref hours) = edits.daily {
        let (start, end) = parse_hours(hours)?;
        schedule = OperatingSchedule::daily(start, end);
    }
    for raw in &edits.open {
        let (day, start, end) = parse_open_day(raw)?;
        schedule.set(day, DaySchedule::open(start, end));
    }
    for raw in &edits.closed {
        let day = parse_day(raw)?;
        let mut entry = *schedule.day(day);
        entry.is_available = false;
        schedule.set(day, entry);
    }
    if let Some(ref source) = edits.copy_from {
        schedule.apply_to_all_days(parse_day(source)?);
    }
    Ok(schedule)
}

/// Warn about open days whose start is not before their end.
pub fn warn_inverted(schedule: &OperatingSchedule, global: &GlobalOpts) {
    let inverted = schedule.inverted_days();
    if inverted.is_empty() {
        return;
    }
    let days: Vec<&str> = inverted.iter().map(|d| d.abbrev()).collect();
    output::notify(
        &Notice::warning(format!(
            "Opening time is not before closing time on: {}",
            days.join(", ")
        )),
        global,
    );
}

// ── Views ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayView {
    day: Weekday,
    #[serde(flatten)]
    schedule: DaySchedule,
}

impl From<&DayView> for DayRow {
    fn from(v: &DayView) -> Self {
        Self {
            day: v.day.abbrev().into(),
            open: util::yes_no(v.schedule.is_available).into(),
            start: v.schedule.start_time.to_string(),
            end: v.schedule.end_time.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupView {
    days: String,
    start_time: ClockTime,
    end_time: ClockTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryView {
    summary: String,
    groups: Vec<GroupView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    inverted_days: Vec<Weekday>,
}

impl SummaryView {
    fn of(schedule: &OperatingSchedule) -> Self {
        let summary = schedule.summary();
        Self {
            summary: summary.to_string(),
            groups: summary
                .groups()
                .map(|g| GroupView {
                    days: g.label(),
                    start_time: g.start_time,
                    end_time: g.end_time,
                })
                .collect(),
            inverted_days: schedule.inverted_days(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ScheduleArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ScheduleCommand::Summary(edits) => {
            let schedule = apply_edits(OperatingSchedule::default(), &edits)?;
            warn_inverted(&schedule, global);
            let view = SummaryView::of(&schedule);
            let out = output::render_single(
                &global.output,
                &view,
                |v| v.summary.clone(),
                |v| v.summary.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScheduleCommand::Week(edits) => {
            let schedule = apply_edits(OperatingSchedule::default(), &edits)?;
            warn_inverted(&schedule, global);
            let days: Vec<DayView> = schedule
                .iter()
                .map(|(day, s)| DayView { day, schedule: *s })
                .collect();
            let out = output::render_list(&global.output, &days, |v| DayRow::from(v), |v| {
                format!("{} {}", v.day.abbrev(), util::yes_no(v.schedule.is_available))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
