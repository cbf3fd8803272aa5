//! Fixed limits and sentinels the purge driver and codec must honor exactly.

/// Maximum rows removed by a single `DELETE ... LIMIT` batch.
pub const MAX_PURGE_LIMIT: u32 = 50_000;

/// Once the oldest purgeable row is this far behind the purge horizon,
/// archiving is forced into monthly windows regardless of configured
/// granularity, so a long-neglected cluster catches up in bounded steps.
pub const MAX_ARCHIVE_AGE_SECS: i64 = 60 * 24 * 60 * 60;

/// Preallocation hint for a fresh archive buffer, sized for a typical
/// multi-thousand-row batch so the packer rarely needs to reallocate.
pub const INITIAL_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Textual form of `NO_VAL - 1`. Job records default `array_task_id` to this
/// before unpack runs, since the field may be legitimately absent in an
/// archive written before array-job support existed.
pub const ARRAY_TASKID_SENTINEL: &str = "4294967294";

/// TRES id used to synthesize a single-key `tres_str` from a bare CPU count
/// on pre-TRES event/reservation archives.
pub const CPU_TRES_ID: &str = "1";

/// Current wire protocol version. Archives are always written at this
/// version; restore accepts any version down to the oldest one each
/// record kind's codec table still lists.
pub const CURRENT_VERSION: u16 = 10;

/// Per-record-kind version thresholds used by the codec to pick a field
/// layout. These are internal tier numbers, not the host daemon's own
/// release-version scheme — only their relative ordering matters.
pub mod thresholds {
    /// Below this version a job's `partition`/`priority`/`id_qos`/`cpus_req`/
    /// `req_mem`/`id_resv` fields were written in a rotated order. At or
    /// above it the field order matches the struct declaration order.
    pub const JOB_SYNCED_FIELD_ORDER: u16 = 8;

    /// Below this version jobs carry no array-job fields at all.
    pub const JOB_ARRAY_FIELDS: u16 = 6;

    /// Below this version jobs carry no `req_mem` field.
    pub const JOB_REQ_MEM: u16 = 4;

    /// Oldest job wire version the codec still understands.
    pub const JOB_MIN_SUPPORTED: u16 = 2;

    /// At or above this version steps carry real `tres_alloc` and the full
    /// min/req cpufreq split; below it, fewer fields and a synthesized TRES.
    pub const STEP_CURRENT: u16 = 6;

    /// Oldest step wire version the codec still understands.
    pub const STEP_MIN_SUPPORTED: u16 = 4;

    /// At or above this version, events and reservations carry a generic
    /// `tres` field; below it they carry a bare CPU count that unpack
    /// synthesizes into a single-key TRES string.
    pub const TRES_INTRODUCED: u16 = 5;
}
