//! SQLite-backed implementation of the archive-core traits: connection
//! pooling, per-cluster schema, the cursor packer, the purge driver, the
//! restore loader, and the legacy-SQL rewriter.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod fs_writer;
pub mod legacy_sql;
pub mod packer;
pub mod pool;
pub mod purge;
pub mod restore;
pub mod schema;
pub mod script_runner;

pub use error::to_sql_err;
pub use executor::RusqliteExecutor;
pub use fs_writer::FilesystemArchiveWriter;
pub use pool::ConnectionPool;
pub use purge::archive_and_purge;
pub use restore::{restore, ArchiveRecordInput};
pub use script_runner::ProcessScriptRunner;
