use super::traits::TableStore;
use super::TableRef;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory table store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    tables: Arc<Mutex<HashMap<TableRef, Vec<u8>>>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table, typically a bronze input
    pub fn with_table(self, table: TableRef, bytes: impl Into<Vec<u8>>) -> Self {
        self.lock().insert(table, bytes.into());
        self
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().map(|t| t.to_string()).collect();
        names.sort();
        names
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TableRef, Vec<u8>>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TableStore for InMemoryTableStore {
    fn read_table(&self, table: &TableRef) -> Result<Vec<u8>> {
        self.lock()
            .get(table)
            .cloned()
            .ok_or_else(|| PipelineError::TableNotFound(table.to_string()))
    }

    fn write_table(&self, table: &TableRef, bytes: &[u8]) -> Result<()> {
        self.lock().insert(table.clone(), bytes.to_vec());
        debug!("Stored {} bytes as {}", bytes.len(), table);
        Ok(())
    }

    fn exists(&self, table: &TableRef) -> bool {
        self.lock().contains_key(table)
    }
}
