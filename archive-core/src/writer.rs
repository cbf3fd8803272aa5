//! The archive-file writer contract. File naming and directory layout are
//! the writer's business, not the purge driver's — see component design
//! for the required `<cluster>_<kind>_<period_start>_<period_end>` shape.

use std::path::PathBuf;

use crate::config::Granularity;
use crate::error::ArchiveResult;
use crate::record::RecordKind;

pub trait ArchiveWriter {
    /// Persist `buffer` durably before returning. Implementations must
    /// fsync and atomically rename into place: a caller that sees `Ok` may
    /// rely on the file surviving a crash immediately afterward.
    fn write(
        &self,
        buffer: &[u8],
        cluster: &str,
        kind: RecordKind,
        period_start: i64,
        period_end: i64,
        granularity: Granularity,
    ) -> ArchiveResult<PathBuf>;
}
