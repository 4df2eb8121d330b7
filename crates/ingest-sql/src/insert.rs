//! Batched row insertion.

use std::collections::BTreeMap;

use ingest_core::model::{Row, Scalar, TableDescriptor};
use libsql::Value;

use crate::error::SqlError;
use crate::pk::reserve_pk_block;
use crate::store::SqlStore;

/// Outcome of inserting one batch of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_attempted: usize,
    pub rows_inserted: usize,
}

impl InsertOutcome {
    #[must_use]
    pub const fn duplicate_count(&self) -> usize {
        self.rows_attempted - self.rows_inserted
    }
}

fn scalar_to_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Integer(i64::from(*b)),
        Scalar::Int(i) => Value::Integer(*i),
        Scalar::Real(r) => Value::Real(*r),
        Scalar::Text(s) => Value::Text(s.clone()),
        Scalar::Timestamp(ts) => Value::Text(ts.to_rfc3339()),
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Null => serde_json::Value::Null,
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Int(i) => serde_json::Value::from(*i),
        Scalar::Real(r) => serde_json::Number::from_f64(*r).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Scalar::Text(s) => serde_json::Value::String(s.clone()),
        Scalar::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
    }
}

/// A JSONB-overflow target: `column` absorbs every row's values for
/// `fields` (incoming-attribute-name, JSON-key pairs) folded into a single
/// JSON object, rather than each field getting its own mapped column.
pub struct Overflow {
    pub column: String,
    pub fields: Vec<(String, String)>,
}

fn overflow_value(overflow: &Overflow, row: &Row) -> Value {
    let mut object = serde_json::Map::with_capacity(overflow.fields.len());
    for (source, json_key) in &overflow.fields {
        if let Some(value) = row.get(source).filter(|v| !v.is_null()) {
            object.insert(json_key.clone(), scalar_to_json(value));
        }
    }
    if object.is_empty() { Value::Null } else { Value::Text(serde_json::Value::Object(object).to_string()) }
}

/// Insert `rows` into `table`, batched in groups of `batch_size` as
/// multi-values statements. `mapping` is incoming attribute (original
/// name) → target column name; columns with no mapped source attribute
/// in a given row are left `NULL`. If `table` has a primary key column
/// not present in `mapping`'s targets, a contiguous block is synthesized
/// via [`reserve_pk_block`] up front for the whole row set.
///
/// `overflow`, when present, names one column (expected not to appear as
/// a target in `mapping`) whose value per row is a JSON object built from
/// its own field list rather than a single mapped source attribute.
///
/// # Errors
///
/// Returns [`SqlError::EmptyRow`] if `table` has no columns, or
/// [`SqlError::Insert`]/[`SqlError::Ddl`] if a batch fails.
pub async fn insert_rows(
    store: &SqlStore,
    table: &TableDescriptor,
    mapping: &BTreeMap<String, String>,
    rows: &[Row],
    batch_size: usize,
    overflow: Option<&Overflow>,
) -> Result<InsertOutcome, SqlError> {
    if table.columns.is_empty() {
        return Err(SqlError::EmptyRow { count: rows.len() });
    }
    if rows.is_empty() {
        return Ok(InsertOutcome::default());
    }

    let pk_column = table.primary_key().filter(|pk| !mapping.values().any(|target| target == &pk.name));
    let synthesized_base = if let Some(pk) = pk_column {
        Some((pk.name.clone(), reserve_pk_block(store, &table.name, u32::try_from(rows.len()).unwrap_or(u32::MAX)).await?))
    } else {
        None
    };

    let non_pk_columns: Vec<&str> =
        table.columns.iter().map(|c| c.name.as_str()).filter(|name| synthesized_base.as_ref().is_none_or(|(pk, _)| pk != name)).collect();

    let mut outcome = InsertOutcome::default();
    for (batch_index, chunk) in rows.chunks(batch_size).enumerate() {
        let chunk_offset = batch_index * batch_size;
        let inserted =
            insert_batch(store, &table.name, &non_pk_columns, mapping, overflow, synthesized_base.as_ref(), chunk, chunk_offset).await?;
        outcome.rows_attempted += chunk.len();
        outcome.rows_inserted += inserted;
    }
    Ok(outcome)
}

async fn insert_batch(
    store: &SqlStore,
    table_name: &str,
    non_pk_columns: &[&str],
    mapping: &BTreeMap<String, String>,
    overflow: Option<&Overflow>,
    synthesized_base: Option<&(String, i64)>,
    chunk: &[Row],
    chunk_offset: usize,
) -> Result<usize, SqlError> {
    let reverse_mapping: BTreeMap<&str, &str> = mapping.iter().map(|(source, target)| (target.as_str(), source.as_str())).collect();

    let mut columns: Vec<&str> = non_pk_columns.to_vec();
    if let Some((pk_name, _)) = synthesized_base {
        columns.insert(0, pk_name.as_str());
    }

    let tx = store.begin().await?;
    let mut values_sql = Vec::with_capacity(chunk.len());
    let mut params: Vec<Value> = Vec::with_capacity(chunk.len() * columns.len());
    for (row_index, row) in chunk.iter().enumerate() {
        let mut placeholders = Vec::with_capacity(columns.len());
        for column in &columns {
            if Some(*column) == synthesized_base.as_ref().map(|(name, _)| name.as_str()) {
                let (_, base) = synthesized_base.expect("checked above");
                params.push(Value::Integer(base + (chunk_offset + row_index) as i64));
            } else if overflow.is_some_and(|o| o.column == *column) {
                params.push(overflow_value(overflow.expect("checked above"), row));
            } else {
                let source_attr = reverse_mapping.get(column).copied().unwrap_or(*column);
                let value = row.get(source_attr).map_or(Value::Null, scalar_to_value);
                params.push(value);
            }
            placeholders.push("?".to_string());
        }
        values_sql.push(format!("({})", placeholders.join(", ")));
    }

    let sql = format!(
        "INSERT INTO {table_name} ({}) VALUES {} ON CONFLICT DO NOTHING",
        columns.join(", "),
        values_sql.join(", ")
    );
    let inserted = tx.execute(&sql, params).await.map_err(SqlError::Insert)?;
    tx.commit().await.map_err(SqlError::Insert)?;
    Ok(inserted as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::create_table;

    fn row(id: i64, name: &str) -> Row {
        let mut r = Row::new();
        r.insert("id".to_string(), Scalar::Int(id));
        r.insert("name".to_string(), Scalar::Text(name.to_string()));
        r
    }

    #[tokio::test]
    async fn inserts_all_rows_with_explicit_pk() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let table =
            create_table(&store, "products", &[("id".into(), "integer".into()), ("name".into(), "text".into())], Some("id"))
                .await
                .unwrap();

        let rows = vec![row(1, "widget"), row(2, "gadget")];
        let outcome = insert_rows(&store, &table, &BTreeMap::new(), &rows, 100, None).await.unwrap();
        assert_eq!(outcome.rows_attempted, 2);
        assert_eq!(outcome.rows_inserted, 2);
        assert_eq!(outcome.duplicate_count(), 0);
    }

    #[tokio::test]
    async fn synthesizes_pk_when_no_id_column_mapped() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let table = create_table(
            &store,
            "events",
            &[("id".into(), "integer".into()), ("payload".into(), "text".into())],
            Some("id"),
        )
        .await
        .unwrap();

        let mut r = Row::new();
        r.insert("payload".to_string(), Scalar::Text("x".into()));
        let outcome = insert_rows(&store, &table, &BTreeMap::new(), &[r], 100, None).await.unwrap();
        assert_eq!(outcome.rows_inserted, 1);
    }

    #[tokio::test]
    async fn empty_table_columns_is_an_error() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let table = TableDescriptor { name: "empty".into(), columns: vec![] };
        let err = insert_rows(&store, &table, &BTreeMap::new(), &[row(1, "x")], 100, None).await.unwrap_err();
        assert!(matches!(err, SqlError::EmptyRow { .. }));
    }

    #[tokio::test]
    async fn overflow_fields_are_folded_into_one_json_object() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let table = create_table(
            &store,
            "products",
            &[("id".into(), "integer".into()), ("name".into(), "text".into()), ("extra_attributes".into(), "text".into())],
            Some("id"),
        )
        .await
        .unwrap();

        let mut r = Row::new();
        r.insert("id".to_string(), Scalar::Int(1));
        r.insert("name".to_string(), Scalar::Text("widget".into()));
        r.insert("warranty_months".to_string(), Scalar::Int(12));
        r.insert("color".to_string(), Scalar::Text("red".into()));

        let overflow = Overflow {
            column: "extra_attributes".to_string(),
            fields: vec![("warranty_months".to_string(), "warranty_months".to_string()), ("color".to_string(), "color".to_string())],
        };

        let outcome = insert_rows(&store, &table, &BTreeMap::new(), &[r], 100, Some(&overflow)).await.unwrap();
        assert_eq!(outcome.rows_inserted, 1);

        let mut rows = store.connection().query("SELECT extra_attributes FROM products WHERE id = 1", ()).await.unwrap();
        let stored = rows.next().await.unwrap().unwrap();
        let extra_attributes: String = stored.get(0).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&extra_attributes).unwrap();
        assert_eq!(parsed["warranty_months"], serde_json::json!(12));
        assert_eq!(parsed["color"], serde_json::json!("red"));
    }

    #[tokio::test]
    async fn overflow_fields_absent_in_row_yield_null() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let table = create_table(
            &store,
            "products",
            &[("id".into(), "integer".into()), ("extra_attributes".into(), "text".into())],
            Some("id"),
        )
        .await
        .unwrap();

        let mut r = Row::new();
        r.insert("id".to_string(), Scalar::Int(1));

        let overflow = Overflow { column: "extra_attributes".to_string(), fields: vec![("missing".to_string(), "missing".to_string())] };
        insert_rows(&store, &table, &BTreeMap::new(), &[r], 100, Some(&overflow)).await.unwrap();

        let mut rows = store.connection().query("SELECT extra_attributes FROM products WHERE id = 1", ()).await.unwrap();
        let stored = rows.next().await.unwrap().unwrap();
        let extra_attributes: Option<String> = stored.get(0).unwrap();
        assert!(extra_attributes.is_none());
    }
}
