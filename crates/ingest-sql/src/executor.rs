//! The SQL executor state machine: decide where incoming attributes land,
//! bring the table's shape up to date, and insert the rows.
//!
//! Ties together [`ingest_match::evolve::evaluate`] (routing decision and
//! attribute mapping), [`crate::descriptor`] (introspection and DDL), and
//! [`crate::insert`] (the actual row writes), refreshing the shared catalog
//! after any structural change so the next file's routing decision sees it.

use std::collections::BTreeMap;

use ingest_core::model::{Attribute, ColumnDescriptor, Row, Scalar, TableDescriptor};
use ingest_match::catalog::SharedCatalog;
use ingest_match::error::MatchError;
use ingest_match::evolve::{Decision, evaluate};

use crate::descriptor::{alter_table, create_table, introspect};
use crate::error::SqlError;
use crate::insert::{InsertOutcome, Overflow, insert_rows};
use crate::store::SqlStore;
use crate::types::infer_column_type;

/// Column that absorbs attributes routed to JSONB overflow rather than a
/// new typed column, when an evolved table has drifted too far from its
/// existing shape to add them individually.
const OVERFLOW_COLUMN: &str = "extra_attributes";

/// What happened when a batch of rows was routed and written.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub decision: Decision,
    pub table: TableDescriptor,
    pub insert: InsertOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Sql(#[from] SqlError),
    #[error("routing decision named table {table:?} which does not exist in the store")]
    MissingTable { table: String },
}

impl ExecutorError {
    #[must_use]
    pub const fn kind(&self) -> ingest_core::errors::ErrorKind {
        match self {
            Self::Match(_) => ingest_core::errors::ErrorKind::Schema,
            Self::Sql(e) => e.kind(),
            Self::MissingTable { .. } => ingest_core::errors::ErrorKind::Schema,
        }
    }
}

/// Route `attributes`/`rows` to a table, evolving or creating it as needed,
/// then insert the rows.
///
/// `requested_pk` is an explicit primary-key attribute name from the caller
/// (e.g. a file format that names its own key column); it is only consulted
/// for brand-new tables, taking priority over the first ID-shaped attribute
/// in `attributes`.
///
/// # Errors
///
/// Returns [`ExecutorError::Match`] if `attributes` is empty, or
/// [`ExecutorError::Sql`] if any DDL or insert step fails.
pub async fn execute(
    store: &SqlStore,
    catalog: &SharedCatalog,
    attributes: &[Attribute],
    rows: &[Row],
    batch_size: usize,
    requested_pk: Option<&str>,
) -> Result<ExecutionOutcome, ExecutorError> {
    let evolution = evaluate(catalog, attributes).await?;

    let (table, mapping, overflow) = match &evolution.decision {
        Decision::SameTable { table } => {
            let descriptor =
                introspect(store, table).await?.ok_or_else(|| ExecutorError::MissingTable { table: table.clone() })?;
            (descriptor, evolution.mapping.clone(), None)
        }
        Decision::EvolvedTable { table, new_fields } => {
            let existing =
                introspect(store, table).await?.ok_or_else(|| ExecutorError::MissingTable { table: table.clone() })?;
            let new_columns = infer_new_columns(attributes, new_fields, rows);
            let alter_outcome = alter_table(store, table, &existing, &new_columns).await?;
            let descriptor = apply_added_columns(existing, alter_outcome.added.clone());
            catalog.refresh(descriptor.clone()).await;
            let mapping = merge_identity_mapping(evolution.mapping.clone(), attributes, &alter_outcome.added);
            let mapping = merge_suppressed_mapping(mapping, attributes, &alter_outcome.mapped_to_existing);
            (descriptor, mapping, None)
        }
        Decision::EvolvedTableJsonb { table, new_fields } => {
            let existing =
                introspect(store, table).await?.ok_or_else(|| ExecutorError::MissingTable { table: table.clone() })?;
            let descriptor = if existing.has_column(OVERFLOW_COLUMN) {
                existing
            } else {
                let alter_outcome =
                    alter_table(store, table, &existing, &[(OVERFLOW_COLUMN.to_string(), "text".to_string())]).await?;
                apply_added_columns(existing, alter_outcome.added)
            };
            catalog.refresh(descriptor.clone()).await;
            let overflow = Overflow { column: OVERFLOW_COLUMN.to_string(), fields: overflow_fields(attributes, new_fields) };
            (descriptor, evolution.mapping.clone(), Some(overflow))
        }
        Decision::NewTable { name } => {
            let pk = select_primary_key(attributes, requested_pk);
            let columns = infer_new_columns(attributes, &attributes.iter().map(|a| a.original.clone()).collect::<Vec<_>>(), rows);
            let descriptor = create_table(store, name, &columns, pk.as_deref()).await?;
            catalog.refresh(descriptor.clone()).await;
            (descriptor, identity_mapping(attributes), None)
        }
    };

    let insert = insert_rows(store, &table, &mapping, rows, batch_size, overflow.as_ref()).await?;
    Ok(ExecutionOutcome { decision: evolution.decision, table, insert })
}

/// Choose the primary key for a brand-new table: the caller's explicit
/// request if it names an attribute actually present, otherwise the first
/// ID-shaped attribute in arrival order, otherwise none.
fn select_primary_key(attributes: &[Attribute], requested_pk: Option<&str>) -> Option<String> {
    if let Some(requested) = requested_pk {
        if let Some(attr) = attributes.iter().find(|a| a.original == requested || a.normalized == requested) {
            return Some(attr.normalized.clone());
        }
    }
    attributes.iter().find(|a| a.is_id_attribute()).map(|a| a.normalized.clone())
}

fn identity_mapping(attributes: &[Attribute]) -> BTreeMap<String, String> {
    attributes.iter().map(|a| (a.original.clone(), a.normalized.clone())).collect()
}

/// Extend an existing `EvolvedTable` mapping with identity entries for
/// columns `alter_table` actually added (normalized name, SQL type pairs).
fn merge_identity_mapping(mut mapping: BTreeMap<String, String>, attributes: &[Attribute], added: &[(String, String)]) -> BTreeMap<String, String> {
    for (normalized_name, _sql_type) in added {
        if let Some(attr) = attributes.iter().find(|a| &a.normalized == *normalized_name) {
            mapping.entry(attr.original.clone()).or_insert_with(|| attr.normalized.clone());
        }
    }
    mapping
}

/// Extend an existing `EvolvedTable` mapping so attributes `alter_table`
/// suppressed as near-duplicates route onto the existing column it found,
/// instead of being silently skipped.
fn merge_suppressed_mapping(
    mut mapping: BTreeMap<String, String>,
    attributes: &[Attribute],
    mapped_to_existing: &[(String, String)],
) -> BTreeMap<String, String> {
    for (normalized_name, existing_column) in mapped_to_existing {
        if let Some(attr) = attributes.iter().find(|a| &a.normalized == *normalized_name) {
            mapping.insert(attr.original.clone(), existing_column.clone());
        }
    }
    mapping
}

fn apply_added_columns(mut existing: TableDescriptor, added: Vec<(String, String)>) -> TableDescriptor {
    for (name, pg_type) in added {
        existing.columns.push(ColumnDescriptor { name, pg_type, nullable: true, is_primary: false });
    }
    existing
}

/// Resolve `new_fields` (normalized names) back to (original, normalized)
/// pairs so every one of them can be folded, by its own key, into the
/// JSONB-overflow object rather than dropped except for one survivor.
fn overflow_fields(attributes: &[Attribute], new_fields: &[String]) -> Vec<(String, String)> {
    new_fields
        .iter()
        .filter_map(|field| attributes.iter().find(|a| &a.normalized == field || &a.original == field))
        .map(|attr| (attr.original.clone(), attr.normalized.clone()))
        .collect()
}

/// Infer SQL types for `field_names` (a subset of `attributes`, by original
/// name) from the values actually present for them across `rows`.
fn infer_new_columns(attributes: &[Attribute], field_names: &[String], rows: &[Row]) -> Vec<(String, String)> {
    field_names
        .iter()
        .filter_map(|field| {
            let attr = attributes.iter().find(|a| &a.original == field || &a.normalized == field)?;
            let samples: Vec<&Scalar> = rows.iter().filter_map(|row| row.get(&attr.original)).filter(|s| !s.is_null()).collect();
            Some((attr.normalized.clone(), infer_column_type(&samples)))
        })
        .collect()
}
