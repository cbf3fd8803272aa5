//! Cursor packer: binds a `SELECT ... FOR UPDATE`-equivalent row stream for
//! one kind and turns it into a packed archive buffer.
//!
//! SQLite has no row-level `FOR UPDATE` clause — there is no MVCC row lock
//! to take. The purge driver gets an equivalent (in fact stronger)
//! guarantee by running the select and the following delete inside a
//! `BEGIN IMMEDIATE` transaction: that takes the database's write lock
//! before the select runs, so no concurrent writer can insert into the
//! selected range before the delete below commits. See `purge::run_window`.

use bytes::BytesMut;
use rusqlite::{Connection, Row};

use archive_core::record::{
    EventRecord, JobRecord, RecordBatch, ReservationRecord, StepRecord, SuspendRecord,
};
use archive_core::{ArchiveResult, RecordKind};

use crate::catalog::KindMeta;
use crate::error::to_sql_err;

pub struct PackedBatch {
    pub period_start: i64,
    pub record_count: u32,
    pub buffer: BytesMut,
}

/// Selects every row of `meta`'s kind at or before `horizon` for `cluster`
/// and packs them. Returns `None` if no rows matched (the caller skips the
/// write entirely, per the cursor packer's contract).
pub fn pack_window(
    conn: &Connection,
    meta: &KindMeta,
    cluster: &str,
    horizon: i64,
    wall_time: i64,
) -> ArchiveResult<Option<PackedBatch>> {
    let table = meta.table_name(cluster);
    let cmp = if meta.strict_upper_bound { "<" } else { "<=" };
    let deleted_clause = if meta.kind.honors_deleted() {
        " AND NOT deleted"
    } else {
        ""
    };
    let col_list = meta.columns.join(", ");
    let sql = format!(
        "SELECT {col_list} FROM \"{table}\" WHERE {tk} {cmp} ?1 AND time_end != 0{deleted} ORDER BY {tk} ASC",
        tk = meta.time_key,
        cmp = cmp,
        deleted = deleted_clause,
    );

    let mut stmt = conn.prepare(&sql).map_err(to_sql_err)?;
    let n = meta.columns.len();
    let mut rows = stmt
        .query_map([horizon], move |row| collect_text_columns(row, n))
        .map_err(to_sql_err)?;

    let mut first_row: Option<Vec<String>> = None;
    let mut cols_batch: Vec<Vec<String>> = Vec::new();
    for row in &mut rows {
        let cols = row.map_err(to_sql_err)?;
        if first_row.is_none() {
            first_row = Some(cols.clone());
        }
        cols_batch.push(cols);
    }
    drop(rows);

    let Some(first) = first_row else {
        return Ok(None);
    };
    let period_start: i64 = first
        .first()
        .and_then(|s| s.parse().ok())
        .unwrap_or(horizon);

    let batch = build_batch(meta.kind, cols_batch);
    let record_count = batch.len() as u32;
    let buffer = archive_core::codec::pack(cluster, wall_time, meta.kind, &batch);

    Ok(Some(PackedBatch {
        period_start,
        record_count,
        buffer,
    }))
}

fn collect_text_columns(row: &Row<'_>, n: usize) -> rusqlite::Result<Vec<String>> {
    (0..n)
        .map(|i| row.get::<_, Option<String>>(i).map(|v| v.unwrap_or_default()))
        .collect()
}

fn build_batch(kind: RecordKind, rows: Vec<Vec<String>>) -> RecordBatch {
    match kind {
        RecordKind::Event => RecordBatch::Event(rows.into_iter().map(event_from_cols).collect()),
        RecordKind::Suspend => {
            RecordBatch::Suspend(rows.into_iter().map(suspend_from_cols).collect())
        }
        RecordKind::Step => RecordBatch::Step(rows.into_iter().map(step_from_cols).collect()),
        RecordKind::Job => RecordBatch::Job(rows.into_iter().map(job_from_cols).collect()),
        RecordKind::Reservation => {
            RecordBatch::Reservation(rows.into_iter().map(reservation_from_cols).collect())
        }
    }
}

fn event_from_cols(c: Vec<String>) -> EventRecord {
    EventRecord {
        time_start: c[0].clone(),
        time_end: c[1].clone(),
        node_name: c[2].clone(),
        cluster_nodes: c[3].clone(),
        reason: c[4].clone(),
        reason_uid: c[5].clone(),
        state: c[6].clone(),
        tres: c[7].clone(),
    }
}

fn suspend_from_cols(c: Vec<String>) -> SuspendRecord {
    SuspendRecord {
        job_db_inx: c[0].clone(),
        id_assoc: c[1].clone(),
        time_start: c[2].clone(),
        time_end: c[3].clone(),
    }
}

fn reservation_from_cols(c: Vec<String>) -> ReservationRecord {
    ReservationRecord {
        id_resv: c[0].clone(),
        assoclist: c[1].clone(),
        flags: c[2].clone(),
        tres: c[3].clone(),
        nodelist: c[4].clone(),
        node_inx: c[5].clone(),
        resv_name: c[6].clone(),
        time_start: c[7].clone(),
        time_end: c[8].clone(),
    }
}

fn job_from_cols(c: Vec<String>) -> JobRecord {
    JobRecord {
        account: c[0].clone(),
        id_array_job: c[1].clone(),
        id_array_task: c[2].clone(),
        array_max_tasks: c[3].clone(),
        nodes_alloc: c[4].clone(),
        id_assoc: c[5].clone(),
        id_block: c[6].clone(),
        derived_ec: c[7].clone(),
        derived_es: c[8].clone(),
        exit_code: c[9].clone(),
        timelimit: c[10].clone(),
        time_eligible: c[11].clone(),
        time_end: c[12].clone(),
        id_group: c[13].clone(),
        job_db_inx: c[14].clone(),
        id_job: c[15].clone(),
        kill_requid: c[16].clone(),
        job_name: c[17].clone(),
        nodelist: c[18].clone(),
        node_inx: c[19].clone(),
        partition: c[20].clone(),
        priority: c[21].clone(),
        id_qos: c[22].clone(),
        cpus_req: c[23].clone(),
        req_mem: c[24].clone(),
        id_resv: c[25].clone(),
        time_start: c[26].clone(),
        state: c[27].clone(),
        time_submit: c[28].clone(),
        time_suspended: c[29].clone(),
        track_steps: c[30].clone(),
        id_user: c[31].clone(),
        wckey: c[32].clone(),
        id_wckey: c[33].clone(),
        tres_alloc: c[34].clone(),
        tres_req: c[35].clone(),
    }
}

fn step_from_cols(c: Vec<String>) -> StepRecord {
    StepRecord {
        job_db_inx: c[0].clone(),
        id_step: c[1].clone(),
        time_start: c[2].clone(),
        time_end: c[3].clone(),
        time_suspended: c[4].clone(),
        step_name: c[5].clone(),
        nodelist: c[6].clone(),
        node_inx: c[7].clone(),
        state: c[8].clone(),
        kill_requid: c[9].clone(),
        exit_code: c[10].clone(),
        nodes_alloc: c[11].clone(),
        task_cnt: c[12].clone(),
        task_dist: c[13].clone(),
        user_sec: c[14].clone(),
        user_usec: c[15].clone(),
        sys_sec: c[16].clone(),
        sys_usec: c[17].clone(),
        max_vsize: c[18].clone(),
        max_vsize_task: c[19].clone(),
        max_vsize_node: c[20].clone(),
        ave_vsize: c[21].clone(),
        max_rss: c[22].clone(),
        max_rss_task: c[23].clone(),
        max_rss_node: c[24].clone(),
        ave_rss: c[25].clone(),
        max_pages: c[26].clone(),
        max_pages_task: c[27].clone(),
        max_pages_node: c[28].clone(),
        ave_pages: c[29].clone(),
        min_cpu: c[30].clone(),
        min_cpu_task: c[31].clone(),
        min_cpu_node: c[32].clone(),
        ave_cpu: c[33].clone(),
        act_cpufreq: c[34].clone(),
        consumed_energy: c[35].clone(),
        req_cpufreq_min: c[36].clone(),
        req_cpufreq: c[37].clone(),
        req_cpufreq_gov: c[38].clone(),
        max_disk_read: c[39].clone(),
        max_disk_read_task: c[40].clone(),
        max_disk_read_node: c[41].clone(),
        ave_disk_read: c[42].clone(),
        max_disk_write: c[43].clone(),
        max_disk_write_task: c[44].clone(),
        max_disk_write_node: c[45].clone(),
        ave_disk_write: c[46].clone(),
        tres_alloc: c[47].clone(),
    }
}
