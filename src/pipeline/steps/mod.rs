use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Host, Listing, ListingWithHost};
use crate::error::{PipelineError, Result};
use crate::pipeline::pipeline_config::StageKind;
use crate::pipeline::processing::quality_gate::QualityReport;
use crate::pipeline::storage::{MaterializedTable, TableStore};

/// Common trait for all pipeline steps
pub trait PipelineStep {
    /// The stage this step implements
    fn stage(&self) -> StageKind;

    /// Compute the stage's table from upstream outputs and materialize it.
    ///
    /// Nothing is written unless the whole table was computed and passed the
    /// quality gate.
    fn execute(&self, inputs: &StageOutputs, store: &dyn TableStore) -> Result<StepOutcome>;
}

/// The table a stage produced, handed by value to downstream stages
#[derive(Debug, Clone)]
pub enum StageOutput {
    Hosts(Vec<Host>),
    Listings(Vec<Listing>),
    Gold(Vec<ListingWithHost>),
}

impl StageOutput {
    pub fn row_count(&self) -> usize {
        match self {
            StageOutput::Hosts(rows) => rows.len(),
            StageOutput::Listings(rows) => rows.len(),
            StageOutput::Gold(rows) => rows.len(),
        }
    }
}

/// Outputs of the stages that have completed so far in a run
#[derive(Debug, Default)]
pub struct StageOutputs {
    outputs: HashMap<StageKind, StageOutput>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stage: StageKind, output: StageOutput) {
        self.outputs.insert(stage, output);
    }

    pub fn hosts(&self) -> Result<&[Host]> {
        match self.outputs.get(&StageKind::HostsSilver) {
            Some(StageOutput::Hosts(rows)) => Ok(rows),
            _ => Err(missing_input(StageKind::HostsSilver)),
        }
    }

    pub fn listings(&self) -> Result<&[Listing]> {
        match self.outputs.get(&StageKind::ListingsSilver) {
            Some(StageOutput::Listings(rows)) => Ok(rows),
            _ => Err(missing_input(StageKind::ListingsSilver)),
        }
    }
}

fn missing_input(stage: StageKind) -> PipelineError {
    PipelineError::Dag(format!("Output of stage '{}' is not available", stage))
}

/// What a step hands back to the orchestrator
#[derive(Debug)]
pub struct StepOutcome {
    pub output: StageOutput,
    pub result: StepResult,
}

/// Result of executing a pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub stage: StageKind,
    pub rows_in: usize,
    pub rows_out: usize,
    pub quality: QualityReport,
    pub materialized: MaterializedTable,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn new(stage: StageKind, rows_in: usize, quality: QualityReport, materialized: MaterializedTable) -> Self {
        Self {
            stage,
            rows_in,
            rows_out: materialized.rows,
            quality,
            materialized,
            duration_ms: 0,
        }
    }
}

pub mod gold;
pub mod hosts_silver;
pub mod listings_silver;

pub use gold::ListingsWithHostsGoldStep;
pub use hosts_silver::HostsSilverStep;
pub use listings_silver::ListingsSilverStep;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_upstream_output_is_an_error() {
        let outputs = StageOutputs::new();
        assert!(matches!(outputs.hosts(), Err(PipelineError::Dag(_))));
        assert!(outputs.listings().is_err());
    }

    #[test]
    fn test_outputs_are_retrievable_by_stage() {
        let mut outputs = StageOutputs::new();
        let listings = StageOutput::Listings(Vec::new());
        assert_eq!(listings.row_count(), 0);
        outputs.insert(StageKind::ListingsSilver, listings);

        assert!(outputs.listings().unwrap().is_empty());
        assert!(outputs.hosts().is_err());
    }
}
