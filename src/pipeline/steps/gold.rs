use tracing::info;

use super::{PipelineStep, StageOutput, StageOutputs, StepOutcome, StepResult};
use crate::error::Result;
use crate::pipeline::pipeline_config::StageKind;
use crate::pipeline::processing::join::join_listings_with_hosts;
use crate::pipeline::processing::quality_gate::{QualityGate, ValidationConfig};
use crate::pipeline::storage::{materialize, TableRef, TableStore};

/// Pipeline step joining the silver tables into the gold table
pub struct ListingsWithHostsGoldStep {
    output: TableRef,
    gate: QualityGate,
}

impl ListingsWithHostsGoldStep {
    pub fn new(output: TableRef, validation: ValidationConfig) -> Self {
        Self {
            output,
            gate: QualityGate::new(validation),
        }
    }
}

impl PipelineStep for ListingsWithHostsGoldStep {
    fn stage(&self) -> StageKind {
        StageKind::ListingsWithHostsGold
    }

    fn execute(&self, inputs: &StageOutputs, store: &dyn TableStore) -> Result<StepOutcome> {
        let listings = inputs.listings()?;
        let hosts = inputs.hosts()?;
        info!("Joining {} listings onto {} hosts", listings.len(), hosts.len());

        let gold = join_listings_with_hosts(listings, hosts)?;

        let report = self.gate.assess_gold(&self.output.name, &gold, listings, hosts);
        report.log();
        report.enforce(self.gate.config.mode)?;

        let materialized = materialize(store, &self.output, &gold)?;
        Ok(StepOutcome {
            result: StepResult::new(self.stage(), listings.len(), report, materialized),
            output: StageOutput::Gold(gold),
        })
    }
}
