//! The archive condition the caller passes in, and the per-kind purge
//! settings it carries. Deliberately `serde`-deserializable so a daemon can
//! load it straight out of its own TOML configuration.

use serde::{Deserialize, Serialize};

use crate::record::RecordKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hours,
    Days,
    Months,
    Years,
}

/// Per-kind purge configuration. Absence of a `PurgeSetting` for a kind
/// (rather than a disabled one) mirrors the `NO_VAL` sentinel the original
/// wire format uses to mean "don't touch this kind at all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeSetting {
    pub purge_enabled: bool,
    pub archive_enabled: bool,
    pub granularity: Granularity,
    pub retention: u32,
}

impl PurgeSetting {
    pub fn new(granularity: Granularity, retention: u32, archive_enabled: bool) -> Self {
        Self {
            purge_enabled: true,
            archive_enabled,
            granularity,
            retention,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCond {
    /// Clusters to operate on; empty means every cluster the caller knows
    /// about.
    pub cluster_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCondition {
    pub archive_dir: Option<String>,
    pub archive_script: Option<String>,
    pub purge_event: Option<PurgeSetting>,
    pub purge_suspend: Option<PurgeSetting>,
    pub purge_step: Option<PurgeSetting>,
    pub purge_job: Option<PurgeSetting>,
    pub purge_resv: Option<PurgeSetting>,
    #[serde(default)]
    pub job_cond: JobCond,
}

impl ArchiveCondition {
    pub fn purge_setting(&self, kind: RecordKind) -> Option<&PurgeSetting> {
        match kind {
            RecordKind::Event => self.purge_event.as_ref(),
            RecordKind::Suspend => self.purge_suspend.as_ref(),
            RecordKind::Step => self.purge_step.as_ref(),
            RecordKind::Job => self.purge_job.as_ref(),
            RecordKind::Reservation => self.purge_resv.as_ref(),
        }
    }

    /// Any enabled kind requires a place to write archives, unless a script
    /// handles the whole pass instead.
    pub fn requires_archive_dir(&self) -> bool {
        self.archive_script.is_none()
            && [
                self.purge_event,
                self.purge_suspend,
                self.purge_step,
                self.purge_job,
                self.purge_resv,
            ]
            .iter()
            .any(|s| s.map(|s| s.archive_enabled).unwrap_or(false))
    }
}
