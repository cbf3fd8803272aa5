use archive_core::codec::Header;
use archive_core::constants::CURRENT_VERSION;
use archive_core::{ArchiveError, RecordKind};
use archive_storage::restore::ArchiveRecordInput;
use archive_storage::{restore, schema, RusqliteExecutor};
use bytes::BytesMut;
use rusqlite::Connection;
use tempfile::NamedTempFile;

#[test]
fn s5_legacy_sql_insert_goes_straight_to_executor() {
    let conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();
    schema::create_cluster_tables(&conn, "c2").unwrap();

    let mut file = NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        b"insert into job_table (jobid, cluster, submit, end) values (17, 'c1', 100, 200), (18, 'c2', 110, 210);",
    )
    .unwrap();

    let mut executor = RusqliteExecutor::new(&conn);
    let input = ArchiveRecordInput {
        insert: None,
        archive_file: Some(file.path().to_path_buf()),
    };
    restore(&input, &mut executor).unwrap();

    let c1_job: String = conn
        .query_row("SELECT id_job FROM \"c1_job_table\"", [], |r| r.get(0))
        .unwrap();
    let c2_job: String = conn
        .query_row("SELECT id_job FROM \"c2_job_table\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(c1_job, "17");
    assert_eq!(c2_job, "18");
}

#[test]
fn s6_incompatible_version_is_rejected_with_no_partial_ingest() {
    let conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();

    let header = Header {
        protocol_version: CURRENT_VERSION + 1,
        wall_time: 0,
        record_kind: RecordKind::Event,
        cluster_name: "c1".to_string(),
        record_count: 0,
    };
    let mut buf = BytesMut::new();
    header.encode(&mut buf);

    let mut file = NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, &buf).unwrap();

    let mut executor = RusqliteExecutor::new(&conn);
    let input = ArchiveRecordInput {
        insert: None,
        archive_file: Some(file.path().to_path_buf()),
    };
    let err = restore(&input, &mut executor).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::IncompatibleVersion { found, max } if found == CURRENT_VERSION + 1 && max == CURRENT_VERSION
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM \"c1_event_table\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn missing_archive_file_is_not_found() {
    let conn = Connection::open_in_memory().unwrap();
    let mut executor = RusqliteExecutor::new(&conn);
    let input = ArchiveRecordInput {
        insert: None,
        archive_file: Some("/nonexistent/path/to/archive".into()),
    };
    let err = restore(&input, &mut executor).unwrap_err();
    assert!(matches!(err, ArchiveError::NotFound(_)));
}

#[test]
fn purge_then_restore_round_trips_the_archived_rows() {
    use archive_core::{ArchiveCondition, Granularity, JobCond, PurgeSetting};
    use archive_storage::{archive_and_purge, FilesystemArchiveWriter, ProcessScriptRunner};
    use tempfile::tempdir;

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_700_000_000;

    let mut conn = Connection::open_in_memory().unwrap();
    schema::create_cluster_tables(&conn, "c1").unwrap();
    conn.execute(
        "INSERT INTO \"c1_event_table\" \
         (time_start, time_end, node_name, cluster_nodes, reason, reason_uid, state, tres) \
         VALUES (?1, ?2, 'n1', '', 'maint', '0', '1', '1=4')",
        [NOW - 30 * DAY, NOW - 29 * DAY],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let writer = FilesystemArchiveWriter::new(dir.path());
    let runner = ProcessScriptRunner;
    let condition = ArchiveCondition {
        archive_dir: Some(dir.path().to_string_lossy().into_owned()),
        archive_script: None,
        purge_event: Some(PurgeSetting::new(Granularity::Days, 7, true)),
        purge_suspend: None,
        purge_step: None,
        purge_job: None,
        purge_resv: None,
        job_cond: JobCond::default(),
    };
    archive_and_purge(&mut conn, &writer, &runner, "c1", &condition, NOW).unwrap();
    assert_eq!(
        conn.query_row::<i64, _, _>("SELECT COUNT(*) FROM \"c1_event_table\"", [], |r| r.get(0))
            .unwrap(),
        0
    );

    let archive_path = std::fs::read_dir(dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();

    let mut executor = RusqliteExecutor::new(&conn);
    let input = ArchiveRecordInput {
        insert: None,
        archive_file: Some(archive_path),
    };
    restore(&input, &mut executor).unwrap();

    let restored: i64 = conn
        .query_row("SELECT COUNT(*) FROM \"c1_event_table\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(restored, 1);
}
