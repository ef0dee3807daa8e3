//! Unified exporter error type used across all phases.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Build,
    Validate,
    Encode,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Build => write!(f, "Build"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Encode => write!(f, "Encode"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{phase}:{code}] {message}{}", node_suffix(.node_id))]
pub struct ExportError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

fn node_suffix(node_id: &Option<String>) -> String {
    match node_id {
        Some(id) => format!(" (node '{}')", id),
        None => String::new(),
    }
}

impl ExportError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        ExportError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn build(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ExportError {
            code: code.into(),
            phase: Phase::Build,
            message: message.into(),
            node_id,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        ExportError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            node_id,
        }
    }

    pub fn encode(code: &str, message: impl Into<String>) -> Self {
        ExportError {
            code: code.into(),
            phase: Phase::Encode,
            message: message.into(),
            node_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_node_when_present() {
        let err = ExportError::validate("V003", "Dag 'main' contains a cycle", Some("a".into()));
        assert_eq!(err.to_string(), "[Validate:V003] Dag 'main' contains a cycle (node 'a')");
    }

    #[test]
    fn display_without_node() {
        let err = ExportError::parse("P001", "bad json");
        assert_eq!(err.to_string(), "[Parse:P001] bad json");
    }
}
