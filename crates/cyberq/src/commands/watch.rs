//! `cyberq watch`: run the poll loop and print every published snapshot.

use std::future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use cyberq_core::{Availability, Coordinator, CoordinatorEvent, ProbeId, Snapshot};

use crate::cli::{OutputFormat, WatchArgs};
use crate::config::Presentation;
use crate::error::CliError;
use crate::output::{self, fmt_temp, paint_status};

/// One line of watch output in the structured formats.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchLine<'a> {
    Data { snapshot: &'a Snapshot },
    Availability { availability: &'a Availability },
}

fn summary_line(snap: &Snapshot, color: bool) -> String {
    let probes = ProbeId::ALL
        .into_iter()
        .map(|id| {
            let reading = snap.probe(id);
            format!(
                "{} {}/{} {}",
                id.default_label(),
                fmt_temp(reading.temperature),
                fmt_temp(Some(reading.target)),
                paint_status(reading.status, color)
            )
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "{} {probes} | fan {}%",
        snap.received_at.format("%H:%M:%S"),
        snap.output_percent
    )
}

fn availability_line(availability: &Availability) -> String {
    match availability {
        Availability::Available => "device available".into(),
        Availability::Unavailable {
            reason,
            consecutive_failures,
            ..
        } => format!("device unavailable ({reason:?}, {consecutive_failures} failed polls)"),
    }
}

fn render(line: &WatchLine<'_>, out: Presentation) -> Result<String, CliError> {
    match out.format {
        OutputFormat::Table | OutputFormat::Plain => Ok(match line {
            WatchLine::Data { snapshot } => summary_line(snapshot, out.color),
            WatchLine::Availability { availability } => availability_line(availability),
        }),
        // one document per line so the stream stays parseable
        OutputFormat::Json | OutputFormat::JsonCompact => {
            output::render_structured(OutputFormat::JsonCompact, line)
        }
        OutputFormat::Yaml => {
            output::render_structured(OutputFormat::Yaml, line).map(|doc| format!("---\n{doc}"))
        }
    }
}

pub fn parse_duration(raw: Option<&str>) -> Result<Option<Duration>, CliError> {
    raw.map(|s| {
        humantime::parse_duration(s).map_err(|e| CliError::Validation {
            field: "for".into(),
            reason: e.to_string(),
        })
    })
    .transpose()
}

pub async fn handle(
    coordinator: &Coordinator,
    args: &WatchArgs,
    out: Presentation,
) -> Result<(), CliError> {
    let limit = parse_duration(args.duration.as_deref())?;

    // subscribe first: the initial poll runs as soon as the loop starts
    let mut events = coordinator.subscribe();
    coordinator.start().await;

    let deadline = async {
        match limit {
            Some(d) => tokio::time::sleep(d).await,
            None => future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen: u64 = 0;
    let result = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break Ok(()),
            () = &mut deadline => break Ok(()),
            event = events.recv() => {
                let line = match event {
                    Ok(CoordinatorEvent::DataUpdated(snap)) => {
                        seen += 1;
                        render(&WatchLine::Data { snapshot: &snap }, out)
                    }
                    Ok(CoordinatorEvent::AvailabilityChanged(availability)) => {
                        render(&WatchLine::Availability { availability: &availability }, out)
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "output fell behind, dropped events");
                        continue;
                    }
                    Err(RecvError::Closed) => break Ok(()),
                };
                match line {
                    Ok(line) => output::print_output(&line, out.quiet),
                    Err(e) => break Err(e),
                }
                if args.count.is_some_and(|n| seen >= n) {
                    break Ok(());
                }
            }
        }
    };

    coordinator.stop().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(
            parse_duration(Some("1m 30s")).ok().flatten(),
            Some(Duration::from_secs(90))
        );
        assert!(parse_duration(Some("soon")).is_err());
        assert!(matches!(parse_duration(None), Ok(None)));
    }
}
