use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::traits::TableStore;
use super::TableRef;
use crate::error::{PipelineError, Result};

/// Filesystem store laying tables out as `<root>/<layer>/<name>.csv`
pub struct FsTableStore {
    root: PathBuf,
}

impl FsTableStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, table: &TableRef) -> PathBuf {
        self.root
            .join(table.layer.as_str())
            .join(format!("{}.csv", table.name))
    }
}

impl TableStore for FsTableStore {
    fn read_table(&self, table: &TableRef) -> Result<Vec<u8>> {
        let path = self.path_for(table);
        if !path.exists() {
            return Err(PipelineError::TableNotFound(format!("{} ({})", table, path.display())));
        }
        Ok(fs::read(path)?)
    }

    fn write_table(&self, table: &TableRef, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(table);
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        // Write beside the target and rename so readers never see a half-written table
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn exists(&self, table: &TableRef) -> bool {
        self.path_for(table).exists()
    }
}
