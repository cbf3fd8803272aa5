//! The `archive_script` escape hatch: when a condition names a script, the
//! purge driver delegates the entire pass to it instead of archiving and
//! deleting itself.

use crate::error::ArchiveResult;

pub trait ScriptRunner {
    /// Invoke `script` for `cluster`, blocking until it exits. A non-zero
    /// exit should surface as `ArchiveError::Io`.
    fn run(&self, script: &str, cluster: &str) -> ArchiveResult<()>;
}
