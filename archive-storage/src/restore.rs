//! Restore loader: takes either a ready-made SQL string or an archive file
//! path, decides whether the file holds a legacy SQL dump or a binary
//! archive, and hands the resulting `INSERT` statement(s) to the caller's
//! `QueryExecutor`.

use std::path::PathBuf;

use archive_core::codec::unpack_batch;
use archive_core::executor::QueryExecutor;
use archive_core::record::RecordBatch;
use archive_core::{ArchiveError, ArchiveResult};

use crate::catalog::{self, KindMeta};
use crate::fs_writer::read_archive_file;
use crate::legacy_sql;

/// Mirrors the external archive-condition record: exactly one of the two
/// fields is expected to be set.
#[derive(Debug, Clone, Default)]
pub struct ArchiveRecordInput {
    pub insert: Option<String>,
    pub archive_file: Option<PathBuf>,
}

const LEGACY_MARKERS: &[&str] = &["insert into ", "delete from ", "drop table ", "truncate table "];

/// Restores one archive record into the live store through `executor`.
pub fn restore(input: &ArchiveRecordInput, executor: &mut dyn QueryExecutor) -> ArchiveResult<()> {
    if let Some(sql) = &input.insert {
        executor.delete(sql)?;
        return Ok(());
    }

    let Some(path) = &input.archive_file else {
        return Err(ArchiveError::InvalidArg(
            "archive record carries neither insert nor archive_file".to_string(),
        ));
    };

    if !path.exists() {
        return Err(ArchiveError::NotFound(format!("{}", path.display())));
    }
    let data = read_archive_file(path)?;
    restore_bytes(&data, executor)
}

fn restore_bytes(data: &[u8], executor: &mut dyn QueryExecutor) -> ArchiveResult<()> {
    if looks_like_legacy_sql(data) {
        let text = String::from_utf8_lossy(data);
        for stmt in legacy_sql::rewrite(&text) {
            executor.delete(&stmt)?;
        }
        return Ok(());
    }

    let (header, batch) = unpack_batch(data)?;
    let insert_sql = build_insert(&header.cluster_name, &batch);
    if let Some(sql) = insert_sql {
        executor.delete(&sql)?;
    }
    Ok(())
}

fn looks_like_legacy_sql(data: &[u8]) -> bool {
    let prefix_len = data.len().min(15);
    let prefix = String::from_utf8_lossy(&data[..prefix_len]).to_ascii_lowercase();
    LEGACY_MARKERS.iter().any(|m| prefix.starts_with(m))
}

/// Builds the multi-row `INSERT` for a decoded batch, or `None` for an
/// empty batch (nothing to restore).
fn build_insert(cluster: &str, batch: &RecordBatch) -> Option<String> {
    if batch.is_empty() {
        return None;
    }

    let meta: &KindMeta = match batch {
        RecordBatch::Event(_) => &catalog::EVENT,
        RecordBatch::Suspend(_) => &catalog::SUSPEND,
        RecordBatch::Step(_) => &catalog::STEP,
        RecordBatch::Job(_) => &catalog::JOB,
        RecordBatch::Reservation(_) => &catalog::RESERVATION,
    };

    let table = meta.table_name(cluster);
    let col_list = meta.columns.join(", ");
    let tuples: Vec<String> = row_tuples(batch)
        .into_iter()
        .map(|cols| format!("({})", cols.iter().map(|c| sql_quote(c)).collect::<Vec<_>>().join(", ")))
        .collect();

    Some(format!(
        "INSERT INTO \"{table}\" ({col_list}) VALUES {}",
        tuples.join(", ")
    ))
}

fn row_tuples(batch: &RecordBatch) -> Vec<Vec<String>> {
    match batch {
        RecordBatch::Event(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    r.time_start.clone(),
                    r.time_end.clone(),
                    r.node_name.clone(),
                    r.cluster_nodes.clone(),
                    r.reason.clone(),
                    r.reason_uid.clone(),
                    r.state.clone(),
                    r.tres.clone(),
                ]
            })
            .collect(),
        RecordBatch::Suspend(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    r.job_db_inx.clone(),
                    r.id_assoc.clone(),
                    r.time_start.clone(),
                    r.time_end.clone(),
                ]
            })
            .collect(),
        RecordBatch::Reservation(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    r.id_resv.clone(),
                    r.assoclist.clone(),
                    r.flags.clone(),
                    r.tres.clone(),
                    r.nodelist.clone(),
                    r.node_inx.clone(),
                    r.resv_name.clone(),
                    r.time_start.clone(),
                    r.time_end.clone(),
                ]
            })
            .collect(),
        RecordBatch::Job(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    r.account.clone(),
                    r.id_array_job.clone(),
                    r.id_array_task.clone(),
                    r.array_max_tasks.clone(),
                    r.nodes_alloc.clone(),
                    r.id_assoc.clone(),
                    r.id_block.clone(),
                    r.derived_ec.clone(),
                    r.derived_es.clone(),
                    r.exit_code.clone(),
                    r.timelimit.clone(),
                    r.time_eligible.clone(),
                    r.time_end.clone(),
                    r.id_group.clone(),
                    r.job_db_inx.clone(),
                    r.id_job.clone(),
                    r.kill_requid.clone(),
                    r.job_name.clone(),
                    r.nodelist.clone(),
                    r.node_inx.clone(),
                    r.partition.clone(),
                    r.priority.clone(),
                    r.id_qos.clone(),
                    r.cpus_req.clone(),
                    r.req_mem.clone(),
                    r.id_resv.clone(),
                    r.time_start.clone(),
                    r.state.clone(),
                    r.time_submit.clone(),
                    r.time_suspended.clone(),
                    r.track_steps.clone(),
                    r.id_user.clone(),
                    r.wckey.clone(),
                    r.id_wckey.clone(),
                    r.tres_alloc.clone(),
                    r.tres_req.clone(),
                ]
            })
            .collect(),
        RecordBatch::Step(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    r.job_db_inx.clone(),
                    r.id_step.clone(),
                    r.time_start.clone(),
                    r.time_end.clone(),
                    r.time_suspended.clone(),
                    r.step_name.clone(),
                    r.nodelist.clone(),
                    r.node_inx.clone(),
                    r.state.clone(),
                    r.kill_requid.clone(),
                    r.exit_code.clone(),
                    r.nodes_alloc.clone(),
                    r.task_cnt.clone(),
                    r.task_dist.clone(),
                    r.user_sec.clone(),
                    r.user_usec.clone(),
                    r.sys_sec.clone(),
                    r.sys_usec.clone(),
                    r.max_vsize.clone(),
                    r.max_vsize_task.clone(),
                    r.max_vsize_node.clone(),
                    r.ave_vsize.clone(),
                    r.max_rss.clone(),
                    r.max_rss_task.clone(),
                    r.max_rss_node.clone(),
                    r.ave_rss.clone(),
                    r.max_pages.clone(),
                    r.max_pages_task.clone(),
                    r.max_pages_node.clone(),
                    r.ave_pages.clone(),
                    r.min_cpu.clone(),
                    r.min_cpu_task.clone(),
                    r.min_cpu_node.clone(),
                    r.ave_cpu.clone(),
                    r.act_cpufreq.clone(),
                    r.consumed_energy.clone(),
                    r.req_cpufreq_min.clone(),
                    r.req_cpufreq.clone(),
                    r.req_cpufreq_gov.clone(),
                    r.max_disk_read.clone(),
                    r.max_disk_read_task.clone(),
                    r.max_disk_read_node.clone(),
                    r.ave_disk_read.clone(),
                    r.max_disk_write.clone(),
                    r.max_disk_write_task.clone(),
                    r.max_disk_write_node.clone(),
                    r.ave_disk_write.clone(),
                    r.tres_alloc.clone(),
                ]
            })
            .collect(),
    }
}

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
