//! Purge driver: for each enabled kind on a cluster, archive and delete
//! aged rows in bounded batches until the configured horizon is reached.

use rusqlite::Connection;
use tracing::{debug, warn};

use archive_core::constants::{MAX_ARCHIVE_AGE_SECS, MAX_PURGE_LIMIT};
use archive_core::script::ScriptRunner;
use archive_core::writer::ArchiveWriter;
use archive_core::{horizon, ArchiveCondition, ArchiveError, ArchiveResult, PurgeSetting};

use crate::catalog::{self, validate_cluster_name, KindMeta};
use crate::error::to_sql_err;
use crate::packer;

/// Runs a full archive-and-purge pass for `cluster` against the given
/// condition. If `archive_script` is set, the whole pass is delegated to
/// the script runner instead.
pub fn archive_and_purge(
    conn: &mut Connection,
    writer: &dyn ArchiveWriter,
    script_runner: &dyn ScriptRunner,
    cluster: &str,
    condition: &ArchiveCondition,
    now: i64,
) -> ArchiveResult<()> {
    validate_cluster_name(cluster)?;

    if let Some(script) = &condition.archive_script {
        return script_runner.run(script, cluster);
    }

    if condition.requires_archive_dir() && condition.archive_dir.is_none() {
        return Err(ArchiveError::InvalidArg(
            "archive_dir is required when any purge kind has archiving enabled".to_string(),
        ));
    }

    for meta in catalog::PURGE_ORDER {
        let Some(setting) = condition.purge_setting(meta.kind) else {
            continue;
        };
        if !setting.purge_enabled {
            continue;
        }
        purge_kind(conn, writer, cluster, meta, setting, now)?;
    }

    Ok(())
}

fn purge_kind(
    conn: &mut Connection,
    writer: &dyn ArchiveWriter,
    cluster: &str,
    meta: &KindMeta,
    setting: &PurgeSetting,
    now: i64,
) -> ArchiveResult<()> {
    let curr_end = horizon::compute_horizon(now, setting.granularity, setting.retention);

    loop {
        let Some(record_start) = find_oldest_record(conn, meta, cluster, curr_end)? else {
            debug!(cluster, kind = ?meta.kind, "no purgeable rows, done");
            break;
        };

        let (tmp_end, granularity) = if curr_end - record_start > MAX_ARCHIVE_AGE_SECS {
            let next_month = horizon::first_instant_of_next_month(record_start);
            (curr_end.min(next_month), archive_core::Granularity::Months)
        } else {
            (curr_end, setting.granularity)
        };

        run_window(conn, writer, cluster, meta, setting, tmp_end, granularity, now)?;

        if tmp_end >= curr_end {
            break;
        }
    }

    Ok(())
}

/// Archives (if enabled) and deletes every qualifying row for one window,
/// inside a `BEGIN IMMEDIATE` transaction so the archive's row set and the
/// first delete batch observe a consistent snapshot.
#[allow(clippy::too_many_arguments)]
fn run_window(
    conn: &mut Connection,
    writer: &dyn ArchiveWriter,
    cluster: &str,
    meta: &KindMeta,
    setting: &PurgeSetting,
    tmp_end: i64,
    granularity: archive_core::Granularity,
    now: i64,
) -> ArchiveResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE").map_err(to_sql_err)?;

    if setting.archive_enabled {
        let packed = match packer::pack_window(conn, meta, cluster, tmp_end, now) {
            Ok(p) => p,
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e);
            }
        };
        if let Some(packed) = packed {
            if packed.record_count > 0 {
                if let Err(e) = writer.write(
                    &packed.buffer,
                    cluster,
                    meta.kind,
                    packed.period_start,
                    tmp_end,
                    granularity,
                ) {
                    let _ = conn.execute_batch("ROLLBACK");
                    warn!(cluster, kind = ?meta.kind, error = %e, "archive write failed, skipping delete for this window");
                    return Err(e);
                }
            }
        }
    }

    let mut deleted = match delete_batch(conn, meta, cluster, tmp_end) {
        Ok(n) => n,
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(e);
        }
    };
    conn.execute_batch("COMMIT").map_err(to_sql_err)?;

    while deleted >= MAX_PURGE_LIMIT as u64 {
        conn.execute_batch("BEGIN IMMEDIATE").map_err(to_sql_err)?;
        deleted = match delete_batch(conn, meta, cluster, tmp_end) {
            Ok(n) => n,
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e);
            }
        };
        conn.execute_batch("COMMIT").map_err(to_sql_err)?;
    }

    Ok(())
}

fn find_oldest_record(
    conn: &Connection,
    meta: &KindMeta,
    cluster: &str,
    horizon: i64,
) -> ArchiveResult<Option<i64>> {
    let table = meta.table_name(cluster);
    let cmp = if meta.strict_upper_bound { "<" } else { "<=" };
    let deleted_clause = if meta.kind.honors_deleted() {
        " AND NOT deleted"
    } else {
        ""
    };
    let sql = format!(
        "SELECT {tk} FROM \"{table}\" WHERE {tk} {cmp} ?1 AND time_end != 0{deleted} ORDER BY {tk} ASC LIMIT 1",
        tk = meta.time_key,
        cmp = cmp,
        deleted = deleted_clause,
    );
    let mut stmt = conn.prepare(&sql).map_err(to_sql_err)?;
    let value: Option<String> = stmt
        .query_row([horizon], |row| row.get(0))
        .map(Some)
        .or_else(|e| {
            if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                Ok(None)
            } else {
                Err(e)
            }
        })
        .map_err(to_sql_err)?;

    Ok(value.and_then(|s| s.parse().ok()))
}

fn delete_batch(
    conn: &Connection,
    meta: &KindMeta,
    cluster: &str,
    tmp_end: i64,
) -> ArchiveResult<u64> {
    let table = meta.table_name(cluster);
    let cmp = if meta.strict_upper_bound { "<" } else { "<=" };
    let sql = format!(
        "DELETE FROM \"{table}\" WHERE rowid IN (SELECT rowid FROM \"{table}\" WHERE {tk} {cmp} ?1 AND time_end != 0 ORDER BY {tk} ASC LIMIT {limit})",
        tk = meta.time_key,
        cmp = cmp,
        limit = MAX_PURGE_LIMIT,
    );
    let affected = conn.execute(&sql, [tmp_end]).map_err(to_sql_err)?;
    Ok(affected as u64)
}
