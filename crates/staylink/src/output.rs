//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Status notices go to stderr with a colored glyph.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use staylink_core::{Notice, NoticeLevel};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn glyph(level: NoticeLevel, color: bool) -> String {
    let (mark, painted) = match level {
        NoticeLevel::Success => ("✓", "✓".green().to_string()),
        NoticeLevel::Info => ("·", "·".cyan().to_string()),
        NoticeLevel::Warning => ("!", "!".yellow().to_string()),
        NoticeLevel::Error => ("✗", "✗".red().to_string()),
    };
    if color { painted } else { mark.to_owned() }
}

/// Print a status line to stderr, respecting quiet mode.
///
/// Warnings and errors are shown even with `--quiet`.
pub fn notify(notice: &Notice, global: &GlobalOpts) {
    let silenced = matches!(notice.level, NoticeLevel::Success | NoticeLevel::Info);
    if global.quiet && silenced {
        return;
    }
    let mark = glyph(notice.level, should_color(&global.color));
    eprintln!("{mark} {}", notice.message);
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Aligned `label: value` lines for detail views.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        key: String,
    }

    fn rows() -> Vec<Row> {
        vec![Row { key: "laundry".into() }, Row { key: "tours".into() }]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &rows(),
            |r| Row { key: r.key.clone() },
            |r| r.key.clone(),
        )
        .unwrap();
        assert_eq!(out, "laundry\ntours");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows(),
            |r| Row { key: r.key.clone() },
            |r| r.key.clone(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"key":"laundry"},{"key":"tours"}]"#);
    }

    #[test]
    fn detail_lines_align_labels() {
        let out = detail_lines(&[("Name", "Deep clean".into()), ("Price", "$40.00".into())]);
        assert_eq!(out, "Name   Deep clean\nPrice  $40.00");
    }

    #[test]
    fn glyph_without_color_is_plain() {
        assert_eq!(glyph(NoticeLevel::Warning, false), "!");
    }
}
