//! Parse phase: definition JSON → Rust types → in-memory pipeline.

pub mod types;

pub use types::*;

use crate::dag::build_dag;
use crate::error::ExportError;
use crate::pipeline::FlowPipeline;

/// Deserialize a pipeline definition JSON string.
pub fn parse(json: &str) -> Result<PipelineDefinition, Vec<ExportError>> {
    serde_json::from_str::<PipelineDefinition>(json).map_err(|e| {
        vec![ExportError::parse(
            "P001",
            format!("Failed to parse pipeline definition JSON: {}", e),
        )]
    })
}

/// Parse JSON and build the pipeline in one step.
pub fn parse_and_build(json: &str) -> Result<FlowPipeline, Vec<ExportError>> {
    let definition = parse(json)?;
    let dag = build_dag(&definition)?;
    Ok(FlowPipeline::new(dag))
}
