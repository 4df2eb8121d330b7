//! Table introspection and DDL: detecting whether a table exists, reading
//! its column descriptor, and emitting CREATE/ALTER statements.

use ingest_core::model::{ColumnDescriptor, TableDescriptor};
use ingest_match::similarity::{name_similarity, type_compatibility};

use crate::error::SqlError;
use crate::store::SqlStore;

const SIMILAR_COLUMN_NAME_THRESHOLD: f64 = 0.8;
const SIMILAR_COLUMN_TYPE_THRESHOLD: f64 = 0.7;

/// Read `table`'s column descriptor from the store's catalog, or `None` if
/// it does not exist.
///
/// # Errors
///
/// Returns [`SqlError::Query`] if introspection fails.
pub async fn introspect(store: &SqlStore, table: &str) -> Result<Option<TableDescriptor>, SqlError> {
    let mut exists = store
        .connection()
        .query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1", [table])
        .await
        .map_err(SqlError::Query)?;
    if exists.next().await.map_err(SqlError::Query)?.is_none() {
        return Ok(None);
    }

    let mut columns = Vec::new();
    let mut rows = store.connection().query(&format!("PRAGMA table_info({table})"), ()).await.map_err(SqlError::Query)?;
    while let Some(row) = rows.next().await.map_err(SqlError::Query)? {
        let name: String = row.get(1).map_err(SqlError::Query)?;
        let pg_type: String = row.get(2).map_err(SqlError::Query)?;
        let notnull: i64 = row.get(3).map_err(SqlError::Query)?;
        let pk: i64 = row.get(5).map_err(SqlError::Query)?;
        columns.push(ColumnDescriptor { name, pg_type, nullable: notnull == 0, is_primary: pk != 0 });
    }
    Ok(Some(TableDescriptor { name: table.to_string(), columns }))
}

/// Emit and run a `CREATE TABLE` statement. Columns are emitted in arrival
/// order; `primary_key` selects which incoming attribute (already mapped
/// to its final column name) becomes the primary key, if any.
///
/// # Errors
///
/// Returns [`SqlError::Ddl`] if the statement fails.
pub async fn create_table(
    store: &SqlStore,
    table: &str,
    columns: &[(String, String)],
    primary_key: Option<&str>,
) -> Result<TableDescriptor, SqlError> {
    let mut parts = Vec::with_capacity(columns.len());
    for (name, sql_type) in columns {
        let is_pk = primary_key == Some(name.as_str());
        if is_pk {
            parts.push(format!("{name} {sql_type} PRIMARY KEY"));
        } else {
            parts.push(format!("{name} {sql_type}"));
        }
    }
    let ddl = format!("CREATE TABLE {table} ({})", parts.join(", "));
    store.execute_ddl(&ddl).await?;

    let descriptor = TableDescriptor {
        name: table.to_string(),
        columns: columns
            .iter()
            .map(|(name, sql_type)| ColumnDescriptor {
                name: name.clone(),
                pg_type: sql_type.clone(),
                nullable: primary_key != Some(name.as_str()),
                is_primary: primary_key == Some(name.as_str()),
            })
            .collect(),
    };
    Ok(descriptor)
}

/// What happened when `new_columns` were proposed for an existing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlterOutcome {
    /// Columns actually added via `ALTER TABLE` (name, SQL type).
    pub added: Vec<(String, String)>,
    /// Columns suppressed because a similar one already exists, paired
    /// with the existing column's name — the caller routes the incoming
    /// attribute's data there instead of dropping it.
    pub mapped_to_existing: Vec<(String, String)>,
}

/// Add `new_columns` to `table`, always `NULL`-able so existing rows stay
/// valid. A column whose name is similar enough to an existing one (by
/// name and type compatibility) is suppressed rather than added; the
/// caller is expected to route its data onto the existing column instead,
/// via `mapped_to_existing`.
///
/// # Errors
///
/// Returns [`SqlError::Ddl`] if any `ALTER TABLE` statement fails.
pub async fn alter_table(
    store: &SqlStore,
    table: &str,
    existing: &TableDescriptor,
    new_columns: &[(String, String)],
) -> Result<AlterOutcome, SqlError> {
    let mut outcome = AlterOutcome::default();
    for (name, sql_type) in new_columns {
        if let Some(existing_column) = suppressing_column(existing, name, sql_type) {
            outcome.mapped_to_existing.push((name.clone(), existing_column.to_string()));
            continue;
        }
        let ddl = format!("ALTER TABLE {table} ADD COLUMN {name} {sql_type}");
        store.execute_ddl(&ddl).await?;
        outcome.added.push((name.clone(), sql_type.clone()));
    }
    Ok(outcome)
}

/// The existing column `candidate_name`/`candidate_type` is similar enough
/// to that adding it as a new column would be redundant, if any.
fn suppressing_column<'a>(existing: &'a TableDescriptor, candidate_name: &str, candidate_type: &str) -> Option<&'a str> {
    existing
        .regular_columns()
        .find(|col| {
            name_similarity(candidate_name, &col.name) >= SIMILAR_COLUMN_NAME_THRESHOLD
                && type_compatibility(Some(candidate_type), &col.pg_type) >= SIMILAR_COLUMN_TYPE_THRESHOLD
        })
        .map(|col| col.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_introspect_round_trips() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        create_table(&store, "products", &[("id".into(), "integer".into()), ("name".into(), "text".into())], Some("id"))
            .await
            .unwrap();

        let descriptor = introspect(&store, "products").await.unwrap().unwrap();
        assert_eq!(descriptor.columns.len(), 2);
        assert!(descriptor.primary_key().is_some());
    }

    #[tokio::test]
    async fn missing_table_introspects_to_none() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        assert!(introspect(&store, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn alter_table_adds_nullable_column() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        create_table(&store, "products", &[("id".into(), "integer".into())], Some("id")).await.unwrap();
        let existing = introspect(&store, "products").await.unwrap().unwrap();

        let outcome = alter_table(&store, "products", &existing, &[("price".into(), "real".into())]).await.unwrap();
        assert_eq!(outcome.added, vec![("price".to_string(), "real".to_string())]);
        assert!(outcome.mapped_to_existing.is_empty());

        let descriptor = introspect(&store, "products").await.unwrap().unwrap();
        assert!(descriptor.column("price").unwrap().nullable);
    }

    #[tokio::test]
    async fn similar_column_addition_is_suppressed_and_mapped_to_existing() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        create_table(&store, "products", &[("id".into(), "integer".into()), ("price".into(), "real".into())], Some("id"))
            .await
            .unwrap();
        let existing = introspect(&store, "products").await.unwrap().unwrap();

        let outcome = alter_table(&store, "products", &existing, &[("price".into(), "real".into())]).await.unwrap();
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.mapped_to_existing, vec![("price".to_string(), "price".to_string())]);
    }
}
