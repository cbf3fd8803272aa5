//! The minimal seam the restore path and the legacy-SQL rewriter need onto
//! whatever live store the caller runs. The purge driver talks to its own
//! connection type directly (it needs transaction and cursor control this
//! interface doesn't expose); this trait exists for the narrower restore
//! write-path described in the external-interfaces contract.

use crate::error::ArchiveResult;

pub trait QueryExecutor {
    /// Run a query and return its rows as text columns, honoring whatever
    /// transaction is currently open.
    fn query(&mut self, sql: &str) -> ArchiveResult<Vec<Vec<Option<String>>>>;

    /// Run a `DELETE` (or other row-affecting statement) and return the
    /// number of rows it touched.
    fn delete(&mut self, sql: &str) -> ArchiveResult<u64>;

    /// Commit the currently open transaction.
    fn commit(&mut self) -> ArchiveResult<()>;
}
