//! Default `ArchiveWriter`: writes to a temp file in the target directory,
//! fsyncs, then atomically renames into place so a reader never observes a
//! partially-written archive.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use archive_core::writer::ArchiveWriter;
use archive_core::{ArchiveResult, Granularity, RecordKind};

pub struct FilesystemArchiveWriter {
    directory: PathBuf,
}

impl FilesystemArchiveWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn kind_name(kind: RecordKind) -> &'static str {
        match kind {
            RecordKind::Event => "event",
            RecordKind::Suspend => "suspend",
            RecordKind::Step => "step",
            RecordKind::Job => "job",
            RecordKind::Reservation => "resv",
        }
    }
}

impl ArchiveWriter for FilesystemArchiveWriter {
    fn write(
        &self,
        buffer: &[u8],
        cluster: &str,
        kind: RecordKind,
        period_start: i64,
        period_end: i64,
        _granularity: Granularity,
    ) -> ArchiveResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;

        let final_name = format!(
            "{cluster}_{}_{period_start}_{period_end}",
            Self::kind_name(kind)
        );
        let final_path = self.directory.join(&final_name);
        let tmp_path = self.directory.join(format!("{final_name}.tmp"));

        if final_path.exists() {
            return Err(archive_core::ArchiveError::InvalidArg(format!(
                "archive file already exists: {}",
                final_path.display()
            )));
        }

        let mut file = File::create(&tmp_path)?;
        file.write_all(buffer)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path)?;
        Ok(final_path)
    }
}

/// Reads a whole archive file into memory, as the restore path needs when
/// it isn't handed a ready-made SQL string.
pub fn read_archive_file(path: &Path) -> ArchiveResult<Vec<u8>> {
    Ok(fs::read(path)?)
}
