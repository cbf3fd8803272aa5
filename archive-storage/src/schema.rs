//! Per-cluster table creation. The live schema migration itself is out of
//! scope (see non-goals); this just gives tests and local experimentation a
//! concrete set of tables shaped like the ones the purge driver queries.

use rusqlite::Connection;

use archive_core::ArchiveResult;

use crate::catalog::{validate_cluster_name, PURGE_ORDER};
use crate::error::to_sql_err;

/// Creates all five per-kind tables for `cluster`, every column `TEXT`
/// (matching the text-only wire transport), plus a `deleted` flag on the
/// two kinds that honor it.
pub fn create_cluster_tables(conn: &Connection, cluster: &str) -> ArchiveResult<()> {
    validate_cluster_name(cluster)?;

    for meta in PURGE_ORDER {
        let table = meta.table_name(cluster);
        let mut cols: Vec<String> = meta.columns.iter().map(|c| format!("{c} TEXT")).collect();
        if meta.kind.honors_deleted() {
            cols.push("deleted INTEGER NOT NULL DEFAULT 0".to_string());
        }
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" ({})",
            cols.join(", ")
        );
        conn.execute_batch(&ddl).map_err(to_sql_err)?;
    }
    Ok(())
}
