//! `cyberq status`: one poll, rendered as a probe table plus settings.

use std::fmt::Write as _;

use tabled::Tabled;

use cyberq_core::model::{Choice, format_hms};
use cyberq_core::{Coordinator, ProbeId, Snapshot};

use crate::config::Presentation;
use crate::error::CliError;
use crate::output::{self, fmt_temp, paint_heading, paint_status};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Probe")]
    probe: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Temp")]
    temp: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn probe_rows(snap: &Snapshot, color: bool) -> Vec<ProbeRow> {
    ProbeId::ALL
        .into_iter()
        .map(|id| {
            let reading = snap.probe(id);
            ProbeRow {
                probe: id.default_label(),
                name: reading.name.clone(),
                temp: fmt_temp(reading.temperature),
                target: fmt_temp(Some(reading.target)),
                status: paint_status(reading.status, color),
            }
        })
        .collect()
}

// ── Detail view ─────────────────────────────────────────────────────

fn detail(snap: &Snapshot, target: &str, color: bool) -> String {
    let heading = snap.device.as_ref().map_or_else(
        || format!("CyberQ at {target}"),
        |d| {
            let firmware = d.firmware_version.as_deref().unwrap_or("unknown");
            format!("{} at {target} (firmware {firmware})", d.name())
        },
    );

    let mut out = paint_heading(&heading, color);
    out.push('\n');
    out.push_str(
        &tabled::Table::new(probe_rows(snap, color))
            .with(tabled::settings::Style::rounded())
            .to_string(),
    );
    out.push('\n');

    let control = &snap.control;
    let _ = writeln!(out, "Fan output:   {}%", snap.output_percent);
    if let Some(shorted) = snap.fan_shorted {
        let _ = writeln!(out, "Fan shorted:  {}", if shorted { "yes" } else { "no" });
    }
    let _ = writeln!(
        out,
        "Timer:        {} ({})",
        format_hms(snap.timer_remaining),
        paint_status(snap.timer_status, color)
    );
    let _ = writeln!(out, "Ramp:         {}", control.ramp.label());
    let _ = writeln!(out, "Cook hold:    {}", fmt_temp(Some(control.cook_hold)));
    let _ = writeln!(out, "Alarm dev:    {}°F", control.alarm_deviation);
    let _ = write!(out, "Updated:      {}", snap.received_at.format("%Y-%m-%d %H:%M:%S UTC"));
    out
}

/// `KEY=value` lines for scripts.
fn plain(snap: &Snapshot) -> String {
    ProbeId::ALL
        .into_iter()
        .map(|id| {
            let reading = snap.probe(id);
            let key: &'static str = id.into();
            let temp = reading
                .temperature
                .map_or_else(|| "OPEN".into(), |t| format!("{t:.1}"));
            format!("{key}={temp}")
        })
        .chain(std::iter::once(format!("output_percent={}", snap.output_percent)))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(coordinator: &Coordinator, out: Presentation) -> Result<(), CliError> {
    let snap = util::fetch_snapshot(coordinator).await?;
    let target = coordinator.config().device_key();
    let rendered = output::render_single(
        out.format,
        snap.as_ref(),
        |s| detail(s, &target, out.color),
        plain,
    )?;
    output::print_output(&rendered, out.quiet);
    Ok(())
}
