use archive_core::{ArchiveCondition, Granularity, JobCond, PurgeSetting};
use archive_storage::{archive_and_purge, schema, FilesystemArchiveWriter, ProcessScriptRunner};
use rusqlite::Connection;
use tempfile::tempdir;

const DAY: i64 = 86_400;
const NOW: i64 = 1_700_000_000;

fn blank_condition() -> ArchiveCondition {
    ArchiveCondition {
        archive_dir: None,
        archive_script: None,
        purge_event: None,
        purge_suspend: None,
        purge_step: None,
        purge_job: None,
        purge_resv: None,
        job_cond: JobCond::default(),
    }
}

fn insert_event(conn: &Connection, cluster: &str, time_start: i64, time_end: i64) {
    conn.execute(
        &format!(
            "INSERT INTO \"{cluster}_event_table\" \
             (time_start, time_end, node_name, cluster_nodes, reason, reason_uid, state, tres) \
             VALUES (?1, ?2, 'n1', '', 'maint', '0', '1', '1=4')"
        ),
        [time_start.to_string(), time_end.to_string()],
    )
    .unwrap();
}

fn insert_job(conn: &Connection, cluster: &str, time_submit: i64, job_id: i64) {
    conn.execute(
        &format!(
            "INSERT INTO \"{cluster}_job_table\" \
             (account, id_array_job, id_array_task, array_max_tasks, nodes_alloc, id_assoc, \
              id_block, derived_ec, derived_es, exit_code, timelimit, time_eligible, time_end, \
              id_group, job_db_inx, id_job, kill_requid, job_name, nodelist, node_inx, partition, \
              priority, id_qos, cpus_req, req_mem, id_resv, time_start, state, time_submit, \
              time_suspended, track_steps, id_user, wckey, id_wckey, tres_alloc, tres_req, deleted) \
             VALUES ('acct', '0', '4294967294', '0', '1', '1', '0', '0', '0', '0', '60', ?1, ?1, \
                      '0', ?2, ?2, '0', 'job', 'n1', '', 'debug', '1', '0', '1', '1024', '0', ?1, \
                      '3', ?1, '0', '1', '0', 'wc', '0', '1=1', '', 0)"
        ),
        [time_submit.to_string(), job_id.to_string()],
    )
    .unwrap();
}

fn insert_step(conn: &Connection, cluster: &str, job_db_inx: i64, id_step: i64, time_start: i64) {
    conn.execute(
        &format!(
            "INSERT INTO \"{cluster}_step_table\" (job_db_inx, id_step, time_start, time_end, deleted) \
             VALUES (?1, ?2, ?3, ?3, 0)"
        ),
        [job_db_inx.to_string(), id_step.to_string(), time_start.to_string()],
    )
    .unwrap();
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |r| r.get(0))
        .unwrap()
}

fn archive_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.ends_with(".tmp"))
        .collect();
    names.sort();
    names
}

#[test]
fn s1_empty_pass_produces_nothing() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();
    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    condition.archive_dir = Some(dir.path().to_string_lossy().into_owned());
    condition.purge_event = Some(PurgeSetting::new(Granularity::Days, 7, true));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    assert!(archive_files(dir.path()).is_empty());
    assert_eq!(count_rows(&conn, "c1_event_table"), 0);
}

#[test]
fn s2_single_window_event_purge() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();

    insert_event(&conn, "c1", NOW - 10 * DAY, NOW - 9 * DAY);
    insert_event(&conn, "c1", NOW - 20 * DAY, NOW - 19 * DAY);
    insert_event(&conn, "c1", NOW - 30 * DAY, NOW - 29 * DAY);
    // still running: must never be deleted regardless of time_start.
    insert_event(&conn, "c1", NOW - 40 * DAY, 0);

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    condition.archive_dir = Some(dir.path().to_string_lossy().into_owned());
    condition.purge_event = Some(PurgeSetting::new(Granularity::Days, 7, true));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    let curr_end = NOW - 7 * DAY;
    let expected_name = format!("c1_event_{}_{}", NOW - 30 * DAY, curr_end);
    assert_eq!(archive_files(dir.path()), vec![expected_name.clone()]);

    let bytes = std::fs::read(dir.path().join(&expected_name)).unwrap();
    let (header, batch) = archive_core::codec::unpack_batch(&bytes).unwrap();
    assert_eq!(header.record_count, 3);
    assert_eq!(batch.len(), 3);

    // the still-running row survives; everything else is gone.
    assert_eq!(count_rows(&conn, "c1_event_table"), 1);
}

#[test]
fn s3_monthly_catch_up_chains_through_multiple_windows() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();

    let t1 = NOW - 400 * DAY;
    let t2 = NOW - 300 * DAY;
    let t3 = NOW - 200 * DAY;
    insert_job(&conn, "c1", t1, 1);
    insert_job(&conn, "c1", t2, 2);
    insert_job(&conn, "c1", t3, 3);

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    condition.archive_dir = Some(dir.path().to_string_lossy().into_owned());
    condition.purge_job = Some(PurgeSetting::new(Granularity::Days, 30, true));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    let files = archive_files(dir.path());
    assert_eq!(files.len(), 3, "one window per monthly catch-up step: {files:?}");

    for (file, record_start) in files.iter().zip([t1, t2, t3]) {
        let expected_end = archive_core::horizon::first_instant_of_next_month(record_start);
        assert_eq!(*file, format!("c1_job_{record_start}_{expected_end}"));
    }

    assert_eq!(count_rows(&conn, "c1_job_table"), 0);
}

#[test]
fn s4_purge_limit_batches_large_deletes() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();

    const TOTAL: i64 = 120_000;
    let tx = conn.transaction().unwrap();
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO \"c1_step_table\" (job_db_inx, id_step, time_start, time_end, deleted) \
                 VALUES (?1, ?2, ?3, ?3, 0)",
            )
            .unwrap();
        for i in 0..TOTAL {
            stmt.execute(rusqlite::params![1, i, NOW - 100 * DAY - i]).unwrap();
        }
    }
    tx.commit().unwrap();
    assert_eq!(count_rows(&conn, "c1_step_table"), TOTAL);

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    // archiving disabled: this scenario is about the delete-batching loop,
    // not the codec.
    condition.purge_step = Some(PurgeSetting::new(Granularity::Days, 7, false));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    assert_eq!(count_rows(&conn, "c1_step_table"), 0);
}

#[test]
fn never_deletes_a_still_running_row() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();
    insert_event(&conn, "c1", NOW - 1000 * DAY, 0);

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    condition.archive_dir = Some(dir.path().to_string_lossy().into_owned());
    condition.purge_event = Some(PurgeSetting::new(Granularity::Days, 1, true));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    assert!(archive_files(dir.path()).is_empty());
    assert_eq!(count_rows(&conn, "c1_event_table"), 1);
}

#[test]
fn job_and_step_both_purge_in_one_pass() {
    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();
    insert_job(&conn, "c1", NOW - 10 * DAY, 1);
    insert_step(&conn, "c1", 1, 1, NOW - 10 * DAY);

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;

    let mut condition = blank_condition();
    condition.archive_dir = Some(dir.path().to_string_lossy().into_owned());
    condition.purge_job = Some(PurgeSetting::new(Granularity::Days, 1, true));
    condition.purge_step = Some(PurgeSetting::new(Granularity::Days, 1, true));

    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();

    let names = archive_files(dir.path());
    assert!(names.iter().any(|n| n.contains("_step_")));
    assert!(names.iter().any(|n| n.contains("_job_")));
    assert_eq!(count_rows(&conn, "c1_job_table"), 0);
    assert_eq!(count_rows(&conn, "c1_step_table"), 0);
}
