//! Connection pool: one exclusive writer for the purge driver, a small
//! round-robin pool of read-only connections for restore/inspection paths.

mod pragmas;
mod read_pool;
mod write_connection;

use std::path::{Path, PathBuf};

use archive_core::ArchiveResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    pub fn open(path: &Path, read_pool_size: usize) -> ArchiveResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// In-memory pool for tests. The writer and readers are separate
    /// in-memory databases (SQLite has no shared in-memory mode without a
    /// URI cache), so tests that need readers to see writer state should
    /// drive everything through `writer` directly instead.
    pub fn open_in_memory(read_pool_size: usize) -> ArchiveResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        let readers = ReadPool::open_in_memory(read_pool_size)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
