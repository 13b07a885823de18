use super::TableRef;
use crate::error::Result;

/// A place tables are read from and materialized to.
///
/// Writes are full-table overwrites keyed by the table reference; the store
/// never merges or appends.
pub trait TableStore {
    /// Read the encoded bytes of a table
    fn read_table(&self, table: &TableRef) -> Result<Vec<u8>>;

    /// Replace the table with `bytes`
    fn write_table(&self, table: &TableRef, bytes: &[u8]) -> Result<()>;

    fn exists(&self, table: &TableRef) -> bool;
}
