// Table storage: layer layout, CSV codec, and the materializer

pub mod codec;
pub mod fs;
pub mod in_memory;
pub mod traits;

pub use codec::{decode_table, encode_table};
pub use fs::FsTableStore;
pub use in_memory::InMemoryTableStore;
pub use traits::TableStore;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::TableColumns;
use crate::error::Result;
use crate::observability::metrics;

/// Refinement level a table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Bronze,
    Silver,
    Gold,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        }
    }
}

/// Stable logical identifier of a table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub layer: Layer,
    pub name: String,
}

impl TableRef {
    pub fn new(layer: Layer, name: impl Into<String>) -> Self {
        Self {
            layer,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer.as_str(), self.name)
    }
}

/// Receipt for a table written to a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedTable {
    pub table: TableRef,
    pub rows: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Encode `rows` and overwrite `table` with them
pub fn materialize<T: Serialize + TableColumns>(store: &dyn TableStore, table: &TableRef, rows: &[T]) -> Result<MaterializedTable> {
    let bytes = encode_table(rows)?;
    store.write_table(table, &bytes)?;

    let receipt = MaterializedTable {
        table: table.clone(),
        rows: rows.len(),
        bytes: bytes.len(),
        sha256: sha256_hex(&bytes),
    };
    metrics::storage::rows_written(&table.name, rows.len());
    info!(table = %table, rows = receipt.rows, sha256 = %receipt.sha256, "Materialized table");
    Ok(receipt)
}

/// Read and decode a table
pub fn load<T: DeserializeOwned>(store: &dyn TableStore, table: &TableRef) -> Result<Vec<T>> {
    let bytes = store.read_table(table)?;
    let rows: Vec<T> = decode_table(&bytes)?;
    metrics::storage::rows_read(&table.name, rows.len());
    Ok(rows)
}
