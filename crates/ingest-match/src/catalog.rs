//! The table-descriptor cache owned by the schema evolution engine: an inverted index from normalized attribute name to the
//! tables that declare it, guarded by a reader-writer lock so many
//! concurrent candidate-retrieval reads don't block on each other, while a
//! refresh after CREATE/ALTER gets exclusive access.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ingest_core::attribute::normalize;
use ingest_core::model::{Attribute, TableDescriptor};
use tokio::sync::RwLock;

/// In-memory catalog of known table descriptors plus the inverted index
/// used for fast candidate retrieval.
#[derive(Debug, Default)]
pub struct SchemaCatalog {
    tables: HashMap<String, TableDescriptor>,
    inverted_index: HashMap<String, HashSet<String>>,
}

impl SchemaCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Insert or replace a table descriptor and refresh its index entries.
    /// Called after every successful CREATE or ALTER.
    pub fn upsert(&mut self, table: TableDescriptor) {
        self.remove_from_index(&table.name);
        for column in table.regular_columns() {
            self.inverted_index.entry(column.name.clone()).or_default().insert(table.name.clone());
        }
        self.tables.insert(table.name.clone(), table);
    }

    fn remove_from_index(&mut self, table_name: &str) {
        for tables in self.inverted_index.values_mut() {
            tables.remove(table_name);
        }
    }

    /// Candidate tables for a set of incoming attributes, by inverted-index
    /// match count, descending.
    #[must_use]
    pub fn candidates_by_index(&self, attrs: &[Attribute]) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for attr in attrs.iter().filter(|a| !a.is_id_attribute()) {
            let key = normalize(&attr.original);
            if let Some(tables) = self.inverted_index.get(&key) {
                for table in tables {
                    *counts.entry(table.clone()).or_insert(0) += 1;
                }
            }
        }
        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// All tables not already present in `exclude`, for the semantic
    /// candidate-retrieval pass.
    #[must_use]
    pub fn tables_excluding<'a>(&'a self, exclude: &HashSet<String>) -> Vec<&'a TableDescriptor> {
        self.tables.values().filter(|t| !exclude.contains(&t.name)).collect()
    }
}

/// A [`SchemaCatalog`] shared across concurrent ingestion workers.
#[derive(Debug, Clone)]
pub struct SharedCatalog(Arc<RwLock<SchemaCatalog>>);

impl SharedCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(SchemaCatalog::new())))
    }

    /// Run `f` against a read guard. Many callers may hold this
    /// concurrently.
    pub async fn read<R>(&self, f: impl FnOnce(&SchemaCatalog) -> R) -> R {
        let guard = self.0.read().await;
        f(&guard)
    }

    /// Upsert a table descriptor under an exclusive write guard.
    pub async fn refresh(&self, table: TableDescriptor) {
        let mut guard = self.0.write().await;
        guard.upsert(table);
    }
}

impl Default for SharedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_core::model::ColumnDescriptor;

    fn products_table() -> TableDescriptor {
        TableDescriptor {
            name: "products".into(),
            columns: vec![
                ColumnDescriptor { name: "id".into(), pg_type: "integer".into(), nullable: false, is_primary: true },
                ColumnDescriptor { name: "name".into(), pg_type: "varchar(100)".into(), nullable: true, is_primary: false },
                ColumnDescriptor { name: "price".into(), pg_type: "real".into(), nullable: true, is_primary: false },
            ],
        }
    }

    #[test]
    fn upsert_populates_inverted_index() {
        let mut catalog = SchemaCatalog::new();
        catalog.upsert(products_table());
        let candidates = catalog.candidates_by_index(&[Attribute::new("price")]);
        assert_eq!(candidates, vec![("products".to_string(), 1)]);
    }

    #[test]
    fn id_attributes_do_not_pollute_the_index() {
        let mut catalog = SchemaCatalog::new();
        catalog.upsert(products_table());
        let candidates = catalog.candidates_by_index(&[Attribute::new("id")]);
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn shared_catalog_refresh_is_visible_to_readers() {
        let shared = SharedCatalog::new();
        shared.refresh(products_table()).await;
        let names = shared.read(|c| c.table_names().len()).await;
        assert_eq!(names, 1);
    }
}
