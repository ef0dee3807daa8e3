//! Structural validation of a workflow dag.
//!
//! The exporter only consumes the pass/fail outcome through [`Validator`];
//! [`StructuralValidator`] is the default used by [`crate::pipeline::FlowPipeline`].

pub mod structural;

use thiserror::Error;

use crate::dag::Dag;
use crate::error::ExportError;

/// Checks a dag and returns every problem found.
pub trait Validator {
    fn validate(&self, dag: &Dag) -> Vec<ExportError>;
}

impl<F> Validator for F
where
    F: Fn(&Dag) -> Vec<ExportError>,
{
    fn validate(&self, dag: &Dag) -> Vec<ExportError> {
        self(dag)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl Validator for StructuralValidator {
    fn validate(&self, dag: &Dag) -> Vec<ExportError> {
        structural::validate_structural(dag)
    }
}

/// A failed validation. Displays as the error messages joined by `"; "`.
#[derive(Debug, Clone, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationFailure(pub Vec<ExportError>);

fn join_messages(errors: &[ExportError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
