//! Error type shared by the codec, the purge driver, and the restore path.
//!
//! Variants are ordered by the precedence the driver applies when more than
//! one failure could be reported for the same operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("archive version {found} is newer than the {max} this build understands")]
    IncompatibleVersion { found: u16, max: u16 },

    #[error("record version {0} is older than this record kind's codec table supports")]
    UnsupportedVersion(u16),

    #[error("legacy SQL grammar error: {0}")]
    LegacySqlGrammar(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e.to_string())
    }
}
