//! `cyberq entities`: the entity set a home-automation host would see.

use tabled::Tabled;

use cyberq_core::entity::HvacMode;
use cyberq_core::{Coordinator, EntityKind, EntityState, EntitySummary, build_entities};

use crate::cli::{EntitiesArgs, EntityKindArg};
use crate::config::Presentation;
use crate::error::CliError;
use crate::output::{self, fmt_temp};

use super::util;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "State")]
    state: String,
}

fn to_row(e: &EntitySummary) -> EntityRow {
    EntityRow {
        id: e.unique_id.clone(),
        name: e.name.clone(),
        kind: e.kind.to_string(),
        category: e.category.map(|c| c.to_string()).unwrap_or_default(),
        state: fmt_state(&e.state),
    }
}

fn fmt_state(state: &EntityState) -> String {
    match state {
        EntityState::Unavailable => "unavailable".into(),
        EntityState::Climate(c) => {
            let mode = match c.mode {
                HvacMode::Heat => "heat",
                HvacMode::Off => "off",
            };
            format!(
                "{} -> {} ({mode}, {})",
                fmt_temp(c.current_temperature),
                fmt_temp(Some(c.target_temperature)),
                c.status
            )
        }
        EntityState::Number(n) => n.to_string(),
        EntityState::Select(s) | EntityState::Text(s) => s.clone(),
        EntityState::Sensor(value) => value.as_ref().map_or_else(|| "--".into(), ToString::to_string),
        EntityState::Switch(on) | EntityState::BinarySensor(on) => {
            String::from(if *on { "on" } else { "off" })
        }
    }
}

fn kind_of(arg: EntityKindArg) -> EntityKind {
    match arg {
        EntityKindArg::BinarySensor => EntityKind::BinarySensor,
        EntityKindArg::Climate => EntityKind::Climate,
        EntityKindArg::Number => EntityKind::Number,
        EntityKindArg::Select => EntityKind::Select,
        EntityKindArg::Sensor => EntityKind::Sensor,
        EntityKindArg::Switch => EntityKind::Switch,
        EntityKindArg::Text => EntityKind::Text,
    }
}

pub async fn handle(
    coordinator: &Coordinator,
    args: &EntitiesArgs,
    out: Presentation,
) -> Result<(), CliError> {
    util::fetch_snapshot(coordinator).await?;

    let kind = args.kind.map(kind_of);
    let summaries: Vec<EntitySummary> = build_entities(coordinator)
        .iter()
        .filter(|e| args.all || e.enabled_by_default())
        .filter(|e| kind.is_none_or(|k| e.kind() == k))
        .map(cyberq_core::Entity::summary)
        .collect();

    let rendered = output::render_list(
        out.format,
        &summaries,
        to_row,
        |e| e.unique_id.clone(),
    )?;
    output::print_output(&rendered, out.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberq_core::entity::ClimateState;
    use cyberq_core::{FieldValue, Status};
    use pretty_assertions::assert_eq;

    #[test]
    fn states_render_compactly() {
        let climate = EntityState::Climate(ClimateState {
            current_temperature: Some(165.3),
            target_temperature: 195.0,
            mode: HvacMode::Heat,
            status: Status::Low,
        });
        assert_eq!(fmt_state(&climate), "165.3°F -> 195.0°F (heat, low)");
        assert_eq!(fmt_state(&EntityState::Sensor(None)), "--");
        assert_eq!(
            fmt_state(&EntityState::Sensor(Some(FieldValue::Number(100.0)))),
            "100"
        );
        assert_eq!(fmt_state(&EntityState::Switch(true)), "on");
        assert_eq!(fmt_state(&EntityState::Unavailable), "unavailable");
    }
}
