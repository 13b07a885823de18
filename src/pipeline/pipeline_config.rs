use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TablesConfig;
use crate::error::{PipelineError, Result};

/// The stages this pipeline knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    HostsSilver,
    ListingsSilver,
    ListingsWithHostsGold,
}

impl StageKind {
    pub fn step_name(&self) -> &'static str {
        match self {
            StageKind::HostsSilver => "hosts_silver",
            StageKind::ListingsSilver => "listings_silver",
            StageKind::ListingsWithHostsGold => "listings_w_hosts_gold",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step_name())
    }
}

/// One node of the pipeline graph: a stage, what it waits on, and the
/// logical name of the table it materializes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    pub stage: StageKind,
    pub output: String,
    pub depends_on: Vec<StageKind>,
}

/// Declarative description of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub stages: Vec<StageSpec>,
}

impl PipelineConfig {
    /// The bronze → silver → gold pipeline over the configured tables
    pub fn medallion(tables: &TablesConfig) -> Self {
        Self {
            name: "listings_medallion".to_string(),
            description: "Cleanse hosts and listings, then join them into the gold table".to_string(),
            stages: vec![
                StageSpec {
                    stage: StageKind::HostsSilver,
                    output: tables.hosts_silver.clone(),
                    depends_on: vec![],
                },
                StageSpec {
                    stage: StageKind::ListingsSilver,
                    output: tables.listings_silver.clone(),
                    depends_on: vec![],
                },
                StageSpec {
                    stage: StageKind::ListingsWithHostsGold,
                    output: tables.listings_w_hosts_gold.clone(),
                    depends_on: vec![StageKind::ListingsSilver, StageKind::HostsSilver],
                },
            ],
        }
    }

    pub fn spec(&self, stage: StageKind) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        self.execution_order().map(|_| ())
    }

    /// Topological order of the stages.
    ///
    /// Ties are broken by declaration order, so the same descriptor always
    /// yields the same order.
    pub fn execution_order(&self) -> Result<Vec<StageKind>> {
        if self.stages.is_empty() {
            return Err(PipelineError::Dag("Pipeline must have at least one stage".to_string()));
        }

        let mut position: HashMap<StageKind, usize> = HashMap::new();
        for (index, spec) in self.stages.iter().enumerate() {
            if position.insert(spec.stage, index).is_some() {
                return Err(PipelineError::Dag(format!("Stage '{}' is declared more than once", spec.stage)));
            }
        }

        let mut pending: Vec<usize> = vec![0; self.stages.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stages.len()];
        for (index, spec) in self.stages.iter().enumerate() {
            for dep in &spec.depends_on {
                let dep_index = *position.get(dep).ok_or_else(|| {
                    PipelineError::Dag(format!("Stage '{}' depends on '{}' which is not in the pipeline", spec.stage, dep))
                })?;
                pending[index] += 1;
                dependents[dep_index].push(index);
            }
        }

        let mut ready: VecDeque<usize> = (0..self.stages.len()).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(self.stages.len());

        while let Some(index) = ready.pop_front() {
            order.push(self.stages[index].stage);
            let mut unlocked = Vec::new();
            for &next in &dependents[index] {
                pending[next] -= 1;
                if pending[next] == 0 {
                    unlocked.push(next);
                }
            }
            unlocked.sort_unstable();
            ready.extend(unlocked);
        }

        if order.len() != self.stages.len() {
            let stuck: Vec<String> = self
                .stages
                .iter()
                .filter(|s| !order.contains(&s.stage))
                .map(|s| s.stage.to_string())
                .collect();
            return Err(PipelineError::Dag(format!("Dependency cycle between: {}", stuck.join(", "))));
        }

        Ok(order)
    }
}
