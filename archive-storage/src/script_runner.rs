//! Default `ScriptRunner`: shells out to the configured `archive_script`
//! and treats a non-zero exit as an I/O failure.

use std::process::Command;

use archive_core::script::ScriptRunner;
use archive_core::{ArchiveError, ArchiveResult};

pub struct ProcessScriptRunner;

impl ScriptRunner for ProcessScriptRunner {
    fn run(&self, script: &str, cluster: &str) -> ArchiveResult<()> {
        let status = Command::new(script)
            .arg(cluster)
            .status()
            .map_err(|e| ArchiveError::Io(format!("failed to spawn {script}: {e}")))?;

        if !status.success() {
            return Err(ArchiveError::Io(format!(
                "archive script {script} exited with {status}"
            )));
        }
        Ok(())
    }
}
