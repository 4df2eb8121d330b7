//! Primary-key value synthesis without the MAX+1 race.
//!
//! A per-table single-row reservation counter (`{table}__pk_seq`) is
//! advanced with an atomic `UPDATE ... RETURNING`, reserving a contiguous
//! block of `n` values for a batch in one round trip. If the store has no
//! `RETURNING` support, synthesis falls back to read-max-then-insert with
//! a bounded retry loop on unique-violation.

use crate::error::SqlError;
use crate::retry::{RetryConfig, is_unique_violation};
use crate::store::SqlStore;

fn seq_table(table: &str) -> String {
    format!("{table}__pk_seq")
}

async fn ensure_seq_table(store: &SqlStore, table: &str) -> Result<(), SqlError> {
    let seq = seq_table(table);
    store
        .execute_ddl(&format!(
            "CREATE TABLE IF NOT EXISTS {seq} (id INTEGER PRIMARY KEY CHECK (id = 0), next_val INTEGER NOT NULL)"
        ))
        .await?;
    store.connection().execute(&format!("INSERT OR IGNORE INTO {seq} (id, next_val) VALUES (0, 1)"), ()).await.map_err(SqlError::Ddl)?;
    Ok(())
}

/// Reserve a contiguous block of `n` sequential integer primary-key values
/// for `table`, returning the first value in the block.
///
/// # Errors
///
/// Returns [`SqlError::PkExhausted`] if the retry fallback exhausts its
/// attempt budget, or a DDL/query error if the reservation itself fails.
pub async fn reserve_pk_block(store: &SqlStore, table: &str, n: u32) -> Result<i64, SqlError> {
    ensure_seq_table(store, table).await?;
    let seq = seq_table(table);

    if store.supports_returning() {
        let mut rows = store
            .connection()
            .query(&format!("UPDATE {seq} SET next_val = next_val + ?1 WHERE id = 0 RETURNING next_val - ?1"), [i64::from(n)])
            .await
            .map_err(SqlError::Ddl)?;
        let row = rows.next().await.map_err(SqlError::Ddl)?.ok_or(SqlError::PkExhausted { attempts: 1 })?;
        return row.get(0).map_err(SqlError::Ddl);
    }

    reserve_via_retry_loop(store, &seq, n).await
}

/// Fallback path: read the current counter, attempt the advance, and
/// retry on a unique-violation race against another writer bumping the
/// same row concurrently.
async fn reserve_via_retry_loop(store: &SqlStore, seq: &str, n: u32) -> Result<i64, SqlError> {
    let config = RetryConfig::default();
    for attempt in 0..config.max_attempts {
        let mut rows =
            store.connection().query(&format!("SELECT next_val FROM {seq} WHERE id = 0"), ()).await.map_err(SqlError::Query)?;
        let Some(row) = rows.next().await.map_err(SqlError::Query)? else {
            return Err(SqlError::PkExhausted { attempts: attempt + 1 });
        };
        let current: i64 = row.get(0).map_err(SqlError::Query)?;

        let updated = store
            .connection()
            .execute(
                &format!("UPDATE {seq} SET next_val = ?1 WHERE id = 0 AND next_val = ?2"),
                libsql::params![current + i64::from(n), current],
            )
            .await;

        match updated {
            Ok(rows_changed) if rows_changed > 0 => return Ok(current),
            Ok(_) => {
                // Another writer won the race; back off and retry the read.
                tokio::time::sleep(config.delay_for(attempt)).await;
            }
            Err(e) if is_unique_violation(&e) => {
                tokio::time::sleep(config.delay_for(attempt)).await;
            }
            Err(e) => return Err(SqlError::Ddl(e)),
        }
    }
    Err(SqlError::PkExhausted { attempts: config.max_attempts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserved_blocks_are_contiguous_and_non_overlapping() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        let first = reserve_pk_block(&store, "products", 5).await.unwrap();
        let second = reserve_pk_block(&store, "products", 3).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 6);
    }

    #[tokio::test]
    async fn distinct_tables_get_independent_sequences() {
        let store = SqlStore::connect_in_memory().await.unwrap();
        reserve_pk_block(&store, "products", 10).await.unwrap();
        let other = reserve_pk_block(&store, "orders", 1).await.unwrap();
        assert_eq!(other, 1);
    }
}
