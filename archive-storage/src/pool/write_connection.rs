//! The single connection the purge driver owns exclusively. Archiving and
//! purging within a cluster is synchronous and single-threaded (see the
//! concurrency model), so there is never more than one writer in flight.

use std::path::Path;

use rusqlite::Connection;

use archive_core::ArchiveResult;

use super::pragmas::apply_pragmas;
use crate::error::to_sql_err;

pub struct WriteConnection {
    pub(crate) conn: Connection,
}

impl WriteConnection {
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let conn = Connection::open(path).map_err(to_sql_err)?;
        apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> ArchiveResult<Self> {
        let conn = Connection::open_in_memory().map_err(to_sql_err)?;
        apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
