//! Export phase: Pipeline → validated DagSnapshot → indented JSON.

pub mod snapshot;
pub mod types;

pub use snapshot::{snapshot_dag, snapshot_node, snapshot_operation};
pub use types::*;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::ExportError;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Spaces per indentation level in the encoded definition.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { indent: 4 }
    }
}

/// Validate the pipeline once and snapshot its root dag.
///
/// The snapshot is built whether or not validation passes, so a consumer can
/// show an invalid workflow next to the reason it is invalid. Nested dags
/// carry no validity of their own.
pub fn export_pipeline<P: Pipeline>(pipeline: &P) -> DagSnapshot {
    let dag = pipeline.workflow_graph();

    let validity = match pipeline.validate() {
        Ok(()) => Validity {
            is_valid: true,
            validation_error: String::new(),
        },
        Err(e) => {
            let message = e.to_string();
            tracing::warn!(dag = dag.id(), error = %message, "pipeline failed validation");
            Validity {
                is_valid: false,
                validation_error: message,
            }
        }
    };

    let mut root = snapshot_dag(dag);
    root.validity = Some(validity);
    root
}

/// The pipeline's definition as 4-space indented JSON.
pub fn get_definition<P: Pipeline>(pipeline: &P) -> Result<String, ExportError> {
    get_definition_with(pipeline, &ExportOptions::default())
}

pub fn get_definition_with<P: Pipeline>(
    pipeline: &P,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let root = export_pipeline(pipeline);
    encode(&root, options)
}

/// Encode any snapshot as indented JSON.
pub fn encode(snapshot: &DagSnapshot, options: &ExportOptions) -> Result<String, ExportError> {
    let indent = " ".repeat(options.indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot
        .serialize(&mut serializer)
        .map_err(|e| ExportError::encode("E001", format!("Failed to encode definition: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| ExportError::encode("E001", format!("Encoded definition is not UTF-8: {}", e)))
}
