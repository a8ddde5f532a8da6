//! Override, delete and restore handlers for spreadsheet products.

use clap::Subcommand;
use hemcat_core::products::coerce_flag;
use hemcat_core::{is_custom_product_id, ProductField};
use serde_json::{Map, Value};

use crate::context::AppContext;

/// Sub-commands available under `override`.
#[derive(Debug, Subcommand)]
pub enum OverrideCommands {
    /// Set one or more fields, e.g. `"SKU Code=NEW-1" ItemName=Foo`
    Set {
        product_id: String,
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Remove one overridden field, or all of them
    Clear {
        product_id: String,
        #[arg(long)]
        field: Option<String>,
    },
}

/// Parses `FIELD=VALUE` into a canonical field and its stored value.
///
/// `IsNew` is stored as `0`/`1`; everything else as text.
pub(crate) fn parse_assignment(raw: &str) -> anyhow::Result<(ProductField, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected FIELD=VALUE, got '{raw}'"))?;
    let field: ProductField = name.trim().parse()?;
    let value = match field {
        ProductField::IsNew => Value::from(u8::from(coerce_flag(value))),
        _ => Value::String(value.to_string()),
    };
    Ok((field, value))
}

fn ensure_spreadsheet_product(product_id: &str) -> anyhow::Result<()> {
    if is_custom_product_id(product_id) {
        anyhow::bail!(
            "'{product_id}' is a custom product; use `custom remove` and `custom add` to change it"
        );
    }
    Ok(())
}

pub(crate) async fn run_override(ctx: &AppContext, command: OverrideCommands) -> anyhow::Result<()> {
    match command {
        OverrideCommands::Set {
            product_id,
            assignments,
        } => {
            ensure_spreadsheet_product(&product_id)?;
            let mut changes = Map::new();
            for raw in &assignments {
                let (field, value) = parse_assignment(raw)?;
                changes.insert(field.as_str().to_string(), value);
            }
            let document = ctx.store.set_override(&product_id, changes).await?;
            let fields = document
                .overrides_for(&product_id)
                .map(|patch| patch.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            println!("{product_id}: overridden fields now {fields}");
        }
        OverrideCommands::Clear { product_id, field } => {
            let field = field
                .map(|name| name.trim().parse::<ProductField>())
                .transpose()?;
            let removed = ctx
                .store
                .clear_override(&product_id, field.map(ProductField::as_str))
                .await?;
            if removed {
                println!("{product_id}: override cleared");
            } else {
                println!("{product_id}: nothing to clear");
            }
        }
    }
    Ok(())
}

pub(crate) async fn run_delete(ctx: &AppContext, product_id: &str) -> anyhow::Result<()> {
    ensure_spreadsheet_product(product_id)?;
    if ctx.store.mark_deleted(product_id).await? {
        println!("{product_id}: deleted");
    } else {
        println!("{product_id}: already deleted");
    }
    Ok(())
}

pub(crate) async fn run_restore(ctx: &AppContext, product_id: &str) -> anyhow::Result<()> {
    if ctx.store.unmark_deleted(product_id).await? {
        println!("{product_id}: restored");
    } else {
        println!("{product_id}: was not deleted");
    }
    Ok(())
}
