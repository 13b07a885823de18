use tracing::info;

use super::{PipelineStep, StageOutput, StageOutputs, StepOutcome, StepResult};
use crate::domain::RawListing;
use crate::error::Result;
use crate::pipeline::pipeline_config::StageKind;
use crate::pipeline::processing::normalize::{ListingsNormalizer, MinimumNightsPolicy, Normalizer};
use crate::pipeline::processing::quality_gate::{QualityGate, ValidationConfig};
use crate::pipeline::storage::{load, materialize, TableRef, TableStore};

/// Pipeline step producing the silver listings table from raw listings
pub struct ListingsSilverStep {
    source: TableRef,
    output: TableRef,
    normalizer: ListingsNormalizer,
    gate: QualityGate,
}

impl ListingsSilverStep {
    pub fn new(source: TableRef, output: TableRef, policy: MinimumNightsPolicy, validation: ValidationConfig) -> Self {
        Self {
            normalizer: ListingsNormalizer::new(source.name.clone(), policy),
            source,
            output,
            gate: QualityGate::new(validation),
        }
    }
}

impl PipelineStep for ListingsSilverStep {
    fn stage(&self) -> StageKind {
        StageKind::ListingsSilver
    }

    fn execute(&self, _inputs: &StageOutputs, store: &dyn TableStore) -> Result<StepOutcome> {
        let raw: Vec<RawListing> = load(store, &self.source)?;
        let rows_in = raw.len();
        info!("Normalizing {} raw listings from {}", rows_in, self.normalizer.source_table());

        let listings = self.normalizer.normalize(raw)?;

        let report = self.gate.assess_listings(&self.output.name, &listings);
        report.log();
        report.enforce(self.gate.config.mode)?;

        let materialized = materialize(store, &self.output, &listings)?;
        Ok(StepOutcome {
            result: StepResult::new(self.stage(), rows_in, report, materialized),
            output: StageOutput::Listings(listings),
        })
    }
}
