//! The five accounting record kinds. Every field is text on the wire — the
//! codec never typechecks a value, only moves it; numeric/enumerated values
//! are stringified by whoever builds the record and re-parsed, if needed, by
//! whoever consumes the restored row.

use serde::{Deserialize, Serialize};

/// One of the five archivable record kinds, in the order the purge driver
/// processes them within a cluster (children before parents: steps before
/// jobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum RecordKind {
    Event = 0,
    Suspend = 1,
    Step = 2,
    Job = 3,
    Reservation = 4,
}

impl RecordKind {
    pub fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Event),
            1 => Some(Self::Suspend),
            2 => Some(Self::Step),
            3 => Some(Self::Job),
            4 => Some(Self::Reservation),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether this kind's rows carry a `deleted` flag that the purge cursor
    /// and the archive query must honor (`AND !deleted`).
    pub fn honors_deleted(self) -> bool {
        matches!(self, Self::Job | Self::Step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time_start: String,
    pub time_end: String,
    pub node_name: String,
    pub cluster_nodes: String,
    pub reason: String,
    pub reason_uid: String,
    pub state: String,
    pub tres: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendRecord {
    pub job_db_inx: String,
    pub id_assoc: String,
    pub time_start: String,
    pub time_end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id_resv: String,
    pub assoclist: String,
    pub flags: String,
    pub tres: String,
    pub nodelist: String,
    pub node_inx: String,
    pub resv_name: String,
    pub time_start: String,
    pub time_end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub account: String,
    pub id_array_job: String,
    pub id_array_task: String,
    pub array_max_tasks: String,
    pub nodes_alloc: String,
    pub id_assoc: String,
    pub id_block: String,
    pub derived_ec: String,
    pub derived_es: String,
    pub exit_code: String,
    pub timelimit: String,
    pub time_eligible: String,
    pub time_end: String,
    pub id_group: String,
    pub job_db_inx: String,
    pub id_job: String,
    pub kill_requid: String,
    pub job_name: String,
    pub nodelist: String,
    pub node_inx: String,
    pub partition: String,
    pub priority: String,
    pub id_qos: String,
    pub cpus_req: String,
    pub req_mem: String,
    pub id_resv: String,
    pub time_start: String,
    pub state: String,
    pub time_submit: String,
    pub time_suspended: String,
    pub track_steps: String,
    pub id_user: String,
    pub wckey: String,
    pub id_wckey: String,
    pub tres_alloc: String,
    pub tres_req: String,
}

impl JobRecord {
    /// Fresh record with every field empty except the array-task-id sentinel
    /// (see `constants::ARRAY_TASKID_SENTINEL`), ready for a historical
    /// unpack to fill in whatever fields that version actually carries.
    pub fn blank_for_unpack() -> Self {
        Self {
            account: String::new(),
            id_array_job: String::new(),
            id_array_task: crate::constants::ARRAY_TASKID_SENTINEL.to_string(),
            array_max_tasks: String::new(),
            nodes_alloc: String::new(),
            id_assoc: String::new(),
            id_block: String::new(),
            derived_ec: String::new(),
            derived_es: String::new(),
            exit_code: String::new(),
            timelimit: String::new(),
            time_eligible: String::new(),
            time_end: String::new(),
            id_group: String::new(),
            job_db_inx: String::new(),
            id_job: String::new(),
            kill_requid: String::new(),
            job_name: String::new(),
            nodelist: String::new(),
            node_inx: String::new(),
            partition: String::new(),
            priority: String::new(),
            id_qos: String::new(),
            cpus_req: String::new(),
            req_mem: String::new(),
            id_resv: String::new(),
            time_start: String::new(),
            state: String::new(),
            time_submit: String::new(),
            time_suspended: String::new(),
            track_steps: String::new(),
            id_user: String::new(),
            wckey: String::new(),
            id_wckey: String::new(),
            tres_alloc: String::new(),
            tres_req: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub job_db_inx: String,
    pub id_step: String,
    pub time_start: String,
    pub time_end: String,
    pub time_suspended: String,
    pub step_name: String,
    pub nodelist: String,
    pub node_inx: String,
    pub state: String,
    pub kill_requid: String,
    pub exit_code: String,
    pub nodes_alloc: String,
    pub task_cnt: String,
    pub task_dist: String,
    pub user_sec: String,
    pub user_usec: String,
    pub sys_sec: String,
    pub sys_usec: String,
    pub max_vsize: String,
    pub max_vsize_task: String,
    pub max_vsize_node: String,
    pub ave_vsize: String,
    pub max_rss: String,
    pub max_rss_task: String,
    pub max_rss_node: String,
    pub ave_rss: String,
    pub max_pages: String,
    pub max_pages_task: String,
    pub max_pages_node: String,
    pub ave_pages: String,
    pub min_cpu: String,
    pub min_cpu_task: String,
    pub min_cpu_node: String,
    pub ave_cpu: String,
    pub act_cpufreq: String,
    pub consumed_energy: String,
    pub req_cpufreq_min: String,
    pub req_cpufreq: String,
    pub req_cpufreq_gov: String,
    pub max_disk_read: String,
    pub max_disk_read_task: String,
    pub max_disk_read_node: String,
    pub ave_disk_read: String,
    pub max_disk_write: String,
    pub max_disk_write_task: String,
    pub max_disk_write_node: String,
    pub ave_disk_write: String,
    pub tres_alloc: String,
}

/// A decoded batch of one kind, as returned by a restore/unpack call that
/// doesn't know the kind ahead of time — it reads the kind off the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBatch {
    Event(Vec<EventRecord>),
    Suspend(Vec<SuspendRecord>),
    Step(Vec<StepRecord>),
    Job(Vec<JobRecord>),
    Reservation(Vec<ReservationRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Event(_) => RecordKind::Event,
            Self::Suspend(_) => RecordKind::Suspend,
            Self::Step(_) => RecordKind::Step,
            Self::Job(_) => RecordKind::Job,
            Self::Reservation(_) => RecordKind::Reservation,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Event(v) => v.len(),
            Self::Suspend(v) => v.len(),
            Self::Step(v) => v.len(),
            Self::Job(v) => v.len(),
            Self::Reservation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
