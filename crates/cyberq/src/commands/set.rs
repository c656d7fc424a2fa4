//! `cyberq set <FIELD> <VALUE>`: one validated write.

use serde::Serialize;

use cyberq_core::{Coordinator, Field, FieldValue};

use crate::cli::SetArgs;
use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct WriteResult {
    field: &'static str,
    value: FieldValue,
}

pub async fn handle(
    coordinator: &Coordinator,
    args: &SetArgs,
    out: Presentation,
) -> Result<(), CliError> {
    let field = Field::from_wire_key(&args.field).ok_or_else(|| CliError::UnknownField {
        name: args.field.clone(),
    })?;
    if !field.is_writable() {
        return Err(CliError::ReadOnly {
            field: field.to_string(),
        });
    }

    let value = field.parse_value(&args.value)?;
    coordinator.write(field, value.clone()).await?;

    let result = WriteResult {
        field: field.wire_key(),
        value,
    };
    let rendered = output::render_single(
        out.format,
        &result,
        |r| format!("{} set to {}", r.field, r.value),
        |r| r.value.to_string(),
    )?;
    output::print_output(&rendered, out.quiet);
    Ok(())
}
