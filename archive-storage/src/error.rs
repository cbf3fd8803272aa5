//! Conversion from this crate's concrete failure sources (`rusqlite`,
//! filesystem I/O) into the shared `ArchiveError`.

use archive_core::ArchiveError;

pub fn to_sql_err(e: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::Sql(e.to_string())
}
