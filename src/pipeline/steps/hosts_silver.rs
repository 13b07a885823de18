use tracing::info;

use super::{PipelineStep, StageOutput, StageOutputs, StepOutcome, StepResult};
use crate::domain::RawHost;
use crate::error::Result;
use crate::pipeline::pipeline_config::StageKind;
use crate::pipeline::processing::normalize::{HostsNormalizer, Normalizer};
use crate::pipeline::processing::quality_gate::{QualityGate, ValidationConfig};
use crate::pipeline::storage::{load, materialize, TableRef, TableStore};

/// Pipeline step producing the silver hosts table from raw hosts
pub struct HostsSilverStep {
    source: TableRef,
    output: TableRef,
    normalizer: HostsNormalizer,
    gate: QualityGate,
}

impl HostsSilverStep {
    pub fn new(source: TableRef, output: TableRef, validation: ValidationConfig) -> Self {
        Self {
            normalizer: HostsNormalizer::new(source.name.clone()),
            source,
            output,
            gate: QualityGate::new(validation),
        }
    }
}

impl PipelineStep for HostsSilverStep {
    fn stage(&self) -> StageKind {
        StageKind::HostsSilver
    }

    fn execute(&self, _inputs: &StageOutputs, store: &dyn TableStore) -> Result<StepOutcome> {
        let raw: Vec<RawHost> = load(store, &self.source)?;
        let rows_in = raw.len();
        info!("Normalizing {} raw hosts from {}", rows_in, self.normalizer.source_table());

        let hosts = self.normalizer.normalize(raw)?;

        let report = self.gate.assess_hosts(&self.output.name, &hosts);
        report.log();
        report.enforce(self.gate.config.mode)?;

        let materialized = materialize(store, &self.output, &hosts)?;
        Ok(StepOutcome {
            result: StepResult::new(self.stage(), rows_in, report, materialized),
            output: StageOutput::Hosts(hosts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::storage::{InMemoryTableStore, Layer};

    const HOSTS_CSV: &str = "id,name,is_superhost,created_at,updated_at\n\
                             1,Ana,t,03-11-21 14:05,15-01-22 09:30\n\
                             2,,f,04-11-21 08:00,04-11-21 08:00\n";

    fn step() -> HostsSilverStep {
        HostsSilverStep::new(
            TableRef::new(Layer::Bronze, "hosts_bronze"),
            TableRef::new(Layer::Silver, "hosts_silver"),
            ValidationConfig::default(),
        )
    }

    #[test]
    fn test_materializes_silver_hosts() {
        let store = InMemoryTableStore::new().with_table(TableRef::new(Layer::Bronze, "hosts_bronze"), HOSTS_CSV);

        let outcome = step().execute(&StageOutputs::new(), &store).unwrap();

        assert_eq!(outcome.result.rows_in, 2);
        assert_eq!(outcome.result.rows_out, 2);
        let written = String::from_utf8(store.read_table(&TableRef::new(Layer::Silver, "hosts_silver")).unwrap()).unwrap();
        assert!(written.starts_with("host_id,host_name,is_superhost,created_at,updated_at\n"));
        assert!(written.contains("2,Anonymous,f,2021-11-04 08:00:00,2021-11-04 08:00:00"));
    }

    #[test]
    fn test_bad_superhost_flag_blocks_materialization() {
        let csv = "id,name,is_superhost,created_at,updated_at\n1,Ana,maybe,03-11-21 14:05,\n";
        let store = InMemoryTableStore::new().with_table(TableRef::new(Layer::Bronze, "hosts_bronze"), csv);

        let err = step().execute(&StageOutputs::new(), &store).unwrap_err();

        assert!(matches!(err, PipelineError::DataQuality { .. }));
        assert!(!store.exists(&TableRef::new(Layer::Silver, "hosts_silver")));
    }
}
