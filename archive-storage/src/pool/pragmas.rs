//! PRAGMA configuration applied to every connection this crate opens.

use rusqlite::Connection;

use archive_core::ArchiveResult;

use crate::error::to_sql_err;

/// Apply the performance and durability pragmas a long-running archive
/// worker wants: WAL journaling, a generous busy timeout so the purge
/// driver's multi-second batched deletes don't spuriously fail against a
/// concurrent reader, and foreign keys on.
pub fn apply_pragmas(conn: &Connection) -> ArchiveResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(to_sql_err)?;
    Ok(())
}

pub fn apply_read_pragmas(conn: &Connection) -> ArchiveResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(to_sql_err)?;
    Ok(())
}
