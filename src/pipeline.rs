//! The collaborator the exporter reads from.

use std::fmt::Display;

use crate::dag::Dag;
use crate::validate::{StructuralValidator, ValidationFailure, Validator};

/// A workflow as seen by the exporter: its root dag and a way to certify it.
pub trait Pipeline {
    type Error: Display;

    fn workflow_graph(&self) -> &Dag;

    fn validate(&self) -> Result<(), Self::Error>;
}

/// A `Pipeline` over an owned dag, certified by a [`Validator`].
#[derive(Debug, Clone)]
pub struct FlowPipeline<V = StructuralValidator> {
    dag: Dag,
    validator: V,
}

impl FlowPipeline {
    pub fn new(dag: Dag) -> Self {
        FlowPipeline {
            dag,
            validator: StructuralValidator,
        }
    }
}

impl<V: Validator> FlowPipeline<V> {
    pub fn with_validator(dag: Dag, validator: V) -> Self {
        FlowPipeline { dag, validator }
    }
}

impl<V: Validator> Pipeline for FlowPipeline<V> {
    type Error = ValidationFailure;

    fn workflow_graph(&self) -> &Dag {
        &self.dag
    }

    fn validate(&self) -> Result<(), ValidationFailure> {
        let errors = self.validator.validate(&self.dag);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure(errors))
        }
    }
}
