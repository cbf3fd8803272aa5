//! Per-kind SQL metadata: table suffix, time-key column, whether the kind
//! honors a `deleted` flag, and the column list in wire order. Shared by the
//! cursor packer, the purge driver, and the restore path's `INSERT` builder.

use archive_core::RecordKind;

pub struct KindMeta {
    pub kind: RecordKind,
    pub table_suffix: &'static str,
    pub time_key: &'static str,
    pub columns: &'static [&'static str],
    /// Jobs compare their time key with a strict `<` against the window
    /// end rather than `<=`, matching the original query template; every
    /// other kind uses `<=`.
    pub strict_upper_bound: bool,
}

pub const EVENT: KindMeta = KindMeta {
    kind: RecordKind::Event,
    table_suffix: "event_table",
    time_key: "time_start",
    strict_upper_bound: false,
    columns: &[
        "time_start",
        "time_end",
        "node_name",
        "cluster_nodes",
        "reason",
        "reason_uid",
        "state",
        "tres",
    ],
};

pub const SUSPEND: KindMeta = KindMeta {
    kind: RecordKind::Suspend,
    strict_upper_bound: false,
    table_suffix: "suspend_table",
    time_key: "time_start",
    columns: &["job_db_inx", "id_assoc", "time_start", "time_end"],
};

// The original source reads `col_name` for the reservation purge loop out of
// the step column-name table (`step_req_inx[STEP_REQ_START]`) rather than a
// hypothetical `resv_req_inx[RESV_REQ_START]`. Both literals are the string
// "time_start" so the emitted SQL is unaffected either way; we use the
// reservation table's own time-key name directly rather than carrying that
// indirection forward.
pub const RESERVATION: KindMeta = KindMeta {
    kind: RecordKind::Reservation,
    strict_upper_bound: false,
    table_suffix: "resv_table",
    time_key: "time_start",
    columns: &[
        "id_resv",
        "assoclist",
        "flags",
        "tres",
        "nodelist",
        "node_inx",
        "resv_name",
        "time_start",
        "time_end",
    ],
};

pub const JOB: KindMeta = KindMeta {
    kind: RecordKind::Job,
    strict_upper_bound: true,
    table_suffix: "job_table",
    time_key: "time_submit",
    columns: &[
        "account",
        "id_array_job",
        "id_array_task",
        "array_max_tasks",
        "nodes_alloc",
        "id_assoc",
        "id_block",
        "derived_ec",
        "derived_es",
        "exit_code",
        "timelimit",
        "time_eligible",
        "time_end",
        "id_group",
        "job_db_inx",
        "id_job",
        "kill_requid",
        "job_name",
        "nodelist",
        "node_inx",
        "partition",
        "priority",
        "id_qos",
        "cpus_req",
        "req_mem",
        "id_resv",
        "time_start",
        "state",
        "time_submit",
        "time_suspended",
        "track_steps",
        "id_user",
        "wckey",
        "id_wckey",
        "tres_alloc",
        "tres_req",
    ],
};

pub const STEP: KindMeta = KindMeta {
    kind: RecordKind::Step,
    strict_upper_bound: false,
    table_suffix: "step_table",
    time_key: "time_start",
    columns: &[
        "job_db_inx",
        "id_step",
        "time_start",
        "time_end",
        "time_suspended",
        "step_name",
        "nodelist",
        "node_inx",
        "state",
        "kill_requid",
        "exit_code",
        "nodes_alloc",
        "task_cnt",
        "task_dist",
        "user_sec",
        "user_usec",
        "sys_sec",
        "sys_usec",
        "max_vsize",
        "max_vsize_task",
        "max_vsize_node",
        "ave_vsize",
        "max_rss",
        "max_rss_task",
        "max_rss_node",
        "ave_rss",
        "max_pages",
        "max_pages_task",
        "max_pages_node",
        "ave_pages",
        "min_cpu",
        "min_cpu_task",
        "min_cpu_node",
        "ave_cpu",
        "act_cpufreq",
        "consumed_energy",
        "req_cpufreq_min",
        "req_cpufreq",
        "req_cpufreq_gov",
        "max_disk_read",
        "max_disk_read_task",
        "max_disk_read_node",
        "ave_disk_read",
        "max_disk_write",
        "max_disk_write_task",
        "max_disk_write_node",
        "ave_disk_write",
        "tres_alloc",
    ],
};

/// Purge processing order within a cluster: events and suspends first (no
/// dependents), then steps, then jobs (so child step rows are gone before
/// their parent job row), then reservations.
pub const PURGE_ORDER: [&KindMeta; 5] = [&EVENT, &SUSPEND, &STEP, &JOB, &RESERVATION];

impl KindMeta {
    pub fn table_name(&self, cluster: &str) -> String {
        format!("{cluster}_{}", self.table_suffix)
    }
}

/// A cluster name must be safe to interpolate into a quoted SQL identifier.
/// Table names are per-cluster (`"<cluster>_<table>"`), so this is the one
/// place user-controlled text reaches SQL structurally rather than as a
/// bound parameter.
pub fn validate_cluster_name(cluster: &str) -> archive_core::ArchiveResult<()> {
    if cluster.is_empty()
        || !cluster
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(archive_core::ArchiveError::InvalidArg(format!(
            "invalid cluster name: {cluster:?}"
        )));
    }
    Ok(())
}
