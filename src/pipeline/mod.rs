// Data processing pipeline: stage descriptors, transformations, and storage

pub mod orchestrator;
pub mod pipeline_config;
pub mod processing;
pub mod steps;
pub mod storage;

// Re-export key types used to assemble and run a pipeline
pub use orchestrator::{PipelineExecutionResult, PipelineOrchestrator};
pub use pipeline_config::{PipelineConfig, StageKind, StageSpec};
