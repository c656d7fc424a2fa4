//! Output formatting: table, JSON, YAML, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one
//! identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use cyberq_core::Status;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// A probe status label, colored by severity.
pub fn paint_status(status: Status, color: bool) -> String {
    let label = status.to_string();
    if !color {
        return label;
    }
    match status {
        Status::Ok | Status::Done => label.green().to_string(),
        Status::High | Status::Low | Status::Hold => label.yellow().to_string(),
        Status::Error | Status::Alarm | Status::Shutdown => label.red().to_string(),
    }
}

pub fn paint_heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are not tabular.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// JSON, compact JSON or YAML; pretty JSON for the non-structured formats.
pub fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data),
        OutputFormat::Yaml => {
            return serde_yaml::to_string(data)
                .map(|s| s.trim_end().to_owned())
                .map_err(|e| CliError::Render(e.to_string()));
        }
        _ => serde_json::to_string_pretty(data),
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Value helpers ────────────────────────────────────────────────────

/// `225.3°F`, or `--` for an unplugged probe.
pub fn fmt_temp(value: Option<f64>) -> String {
    value.map_or_else(|| "--".into(), |v| format!("{v:.1}°F"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Item {
        key: &'static str,
        value: u8,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Key")]
        key: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { key: "ALARMDEV", value: 50 },
            Item { key: "LCD_BACKLIGHT", value: 47 },
        ]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            OutputFormat::Plain,
            &items(),
            |i| ItemRow { key: i.key },
            |i| i.key.to_owned(),
        )
        .unwrap_or_default();
        assert_eq!(out, "ALARMDEV\nLCD_BACKLIGHT");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_structured(OutputFormat::JsonCompact, &items()).unwrap_or_default();
        assert_eq!(out, r#"[{"key":"ALARMDEV","value":50},{"key":"LCD_BACKLIGHT","value":47}]"#);
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(
            OutputFormat::Table,
            &items(),
            |i| ItemRow { key: i.key },
            |i| i.key.to_owned(),
        )
        .unwrap_or_default();
        assert!(out.contains("Key"));
        assert!(out.contains("LCD_BACKLIGHT"));
    }

    #[test]
    fn temperatures() {
        assert_eq!(fmt_temp(Some(225.0)), "225.0°F");
        assert_eq!(fmt_temp(None), "--");
        assert_eq!(paint_status(Status::Ok, false), Status::Ok.to_string());
    }
}
