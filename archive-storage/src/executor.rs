//! `QueryExecutor` implementation over a live `rusqlite::Connection`, used
//! by the restore path and the legacy-SQL rewriter's caller to replay
//! generated SQL text.

use rusqlite::Connection;

use archive_core::executor::QueryExecutor;
use archive_core::ArchiveResult;

use crate::error::to_sql_err;

pub struct RusqliteExecutor<'a> {
    conn: &'a Connection,
}

impl<'a> RusqliteExecutor<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl QueryExecutor for RusqliteExecutor<'_> {
    fn query(&mut self, sql: &str) -> ArchiveResult<Vec<Vec<Option<String>>>> {
        let mut stmt = self.conn.prepare(sql).map_err(to_sql_err)?;
        let col_count = stmt.column_count();
        let rows = stmt
            .query_map([], move |row| {
                (0..col_count)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(to_sql_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
    }

    fn delete(&mut self, sql: &str) -> ArchiveResult<u64> {
        let affected = self.conn.execute(sql, []).map_err(to_sql_err)?;
        Ok(affected as u64)
    }

    fn commit(&mut self) -> ArchiveResult<()> {
        self.conn.execute_batch("COMMIT").map_err(to_sql_err)?;
        Ok(())
    }
}
