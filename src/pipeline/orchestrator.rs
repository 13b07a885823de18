use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span};
use uuid::Uuid;

use super::pipeline_config::{PipelineConfig, StageKind, StageSpec};
use super::processing::quality_gate::{QualityGate, QualityReport};
use super::steps::{
    HostsSilverStep, ListingsSilverStep, ListingsWithHostsGoldStep, PipelineStep, StageOutput, StageOutputs,
    StepOutcome, StepResult,
};
use super::storage::{load, Layer, TableRef, TableStore};
use crate::config::Config;
use crate::domain::{Host, Listing, ListingWithHost};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Runs a pipeline descriptor against a table store.
///
/// Stages execute one at a time in topological order; the first failing stage
/// aborts the run.
pub struct PipelineOrchestrator {
    config: Config,
    pipeline: PipelineConfig,
    store: Box<dyn TableStore>,
}

impl PipelineOrchestrator {
    /// Orchestrator for the stock bronze → silver → gold pipeline
    pub fn new(config: Config, store: Box<dyn TableStore>) -> Self {
        let pipeline = PipelineConfig::medallion(&config.tables);
        Self::with_pipeline(config, pipeline, store)
    }

    pub fn with_pipeline(config: Config, pipeline: PipelineConfig, store: Box<dyn TableStore>) -> Self {
        Self {
            config,
            pipeline,
            store,
        }
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn store(&self) -> &dyn TableStore {
        self.store.as_ref()
    }

    /// Run every stage of the pipeline
    pub fn run(&self) -> Result<PipelineExecutionResult> {
        let order = self.pipeline.execution_order()?;
        let mut execution_result = PipelineExecutionResult::new(self.pipeline.name.clone());

        let span = info_span!("pipeline", name = %self.pipeline.name, run_id = %execution_result.run_id);
        let _enter = span.enter();
        info!("Starting pipeline '{}': {}", self.pipeline.name, self.pipeline.description);

        let mut outputs = StageOutputs::new();
        for (step_index, stage) in order.iter().enumerate() {
            let spec = self.spec(*stage)?;
            info!("Executing step {}/{}: {}", step_index + 1, order.len(), stage);

            let outcome = self.execute_step(spec, &outputs)?;
            execution_result.step_results.push(outcome.result);
            outputs.insert(*stage, outcome.output);
        }

        execution_result.complete();
        info!(
            "Pipeline '{}' completed: {} stages, {} rows written",
            self.pipeline.name,
            execution_result.step_results.len(),
            execution_result.total_rows_written()
        );
        Ok(execution_result)
    }

    /// Run a single stage, reading its dependencies from their materialized
    /// tables
    pub fn run_stage(&self, stage: StageKind) -> Result<StepResult> {
        self.pipeline.validate()?;
        let spec = self.spec(stage)?;

        let mut inputs = StageOutputs::new();
        for dep in &spec.depends_on {
            let output = self.load_output(self.spec(*dep)?)?;
            inputs.insert(*dep, output);
        }

        self.execute_step(spec, &inputs).map(|outcome| outcome.result)
    }

    /// Re-check the materialized silver and gold tables against their
    /// contracts without failing on violations
    pub fn validate(&self) -> Result<Vec<QualityReport>> {
        let gate = QualityGate::new(self.config.validation.clone());
        let tables = &self.config.tables;

        let hosts: Vec<Host> = load(self.store(), &tables.hosts_silver())?;
        let listings: Vec<Listing> = load(self.store(), &tables.listings_silver())?;
        let gold: Vec<ListingWithHost> = load(self.store(), &tables.listings_w_hosts_gold())?;

        let reports = vec![
            gate.assess_hosts(&tables.hosts_silver, &hosts),
            gate.assess_listings(&tables.listings_silver, &listings),
            gate.assess_gold(&tables.listings_w_hosts_gold, &gold, &listings, &hosts),
        ];
        for report in &reports {
            report.log();
        }
        Ok(reports)
    }

    fn spec(&self, stage: StageKind) -> Result<&StageSpec> {
        self.pipeline
            .spec(stage)
            .ok_or_else(|| PipelineError::Dag(format!("Stage '{}' is not part of pipeline '{}'", stage, self.pipeline.name)))
    }

    fn execute_step(&self, spec: &StageSpec, inputs: &StageOutputs) -> Result<StepOutcome> {
        let span = info_span!("stage", stage = %spec.stage);
        let _enter = span.enter();

        let step = self.create_step(spec);
        let started = Instant::now();

        match step.execute(inputs, self.store()) {
            Ok(mut outcome) => {
                let elapsed = started.elapsed();
                outcome.result.duration_ms = elapsed.as_millis() as u64;
                metrics::stage::success(spec.stage.step_name());
                metrics::stage::duration(spec.stage.step_name(), elapsed.as_secs_f64());
                info!(
                    "Step '{}' completed: {} rows in, {} rows out, {:?}",
                    spec.stage,
                    outcome.result.rows_in,
                    outcome.result.rows_out,
                    outcome.result.quality.decision()
                );
                Ok(outcome)
            }
            Err(e) => {
                metrics::stage::error(spec.stage.step_name());
                error!("Step '{}' failed: {}", spec.stage, e);
                Err(e)
            }
        }
    }

    /// Create a step instance from its descriptor
    fn create_step(&self, spec: &StageSpec) -> Box<dyn PipelineStep> {
        let tables = &self.config.tables;
        let validation = self.config.validation.clone();
        let output = TableRef::new(output_layer(spec.stage), &spec.output);

        match spec.stage {
            StageKind::HostsSilver => Box::new(HostsSilverStep::new(tables.hosts_bronze(), output, validation)),
            StageKind::ListingsSilver => Box::new(ListingsSilverStep::new(
                tables.listings_bronze(),
                output,
                self.config.normalize.minimum_nights_policy,
                validation,
            )),
            StageKind::ListingsWithHostsGold => Box::new(ListingsWithHostsGoldStep::new(output, validation)),
        }
    }

    fn load_output(&self, spec: &StageSpec) -> Result<StageOutput> {
        let table = TableRef::new(output_layer(spec.stage), &spec.output);
        let output = match spec.stage {
            StageKind::HostsSilver => StageOutput::Hosts(load(self.store(), &table)?),
            StageKind::ListingsSilver => StageOutput::Listings(load(self.store(), &table)?),
            StageKind::ListingsWithHostsGold => StageOutput::Gold(load(self.store(), &table)?),
        };
        info!("Loaded {} rows from {} for stage '{}'", output.row_count(), table, spec.stage);
        Ok(output)
    }
}

fn output_layer(stage: StageKind) -> Layer {
    match stage {
        StageKind::HostsSilver | StageKind::ListingsSilver => Layer::Silver,
        StageKind::ListingsWithHostsGold => Layer::Gold,
    }
}

/// Result of executing a complete pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineExecutionResult {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub step_results: Vec<StepResult>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineExecutionResult {
    pub fn new(pipeline_name: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline_name,
            step_results: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }

    pub fn total_rows_written(&self) -> usize {
        self.step_results.iter().map(|r| r.rows_out).sum()
    }

    pub fn step(&self, stage: StageKind) -> Option<&StepResult> {
        self.step_results.iter().find(|r| r.stage == stage)
    }

    /// Pretty JSON summary of the run, including every table receipt
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
