//! WASM entry points for browser use.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::ExportError;
use crate::export;

/// Parse + build + export a pipeline definition JSON.
/// Returns `{status: "success", value: definition}` or `{status: "errors", value: [errors]}`.
#[wasm_bindgen]
pub fn export_definition(json: &str) -> JsValue {
    let result = export_definition_result(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

pub fn export_definition_result(json: &str) -> ExportResult {
    let pipeline = match crate::parse::parse_and_build(json) {
        Ok(p) => p,
        Err(errors) => {
            return ExportResult::Errors(errors.into_iter().map(ErrorDto::from).collect());
        }
    };

    match export::get_definition(&pipeline) {
        Ok(definition) => ExportResult::Success(definition),
        Err(e) => ExportResult::Errors(vec![ErrorDto::from(e)]),
    }
}

/// Parse + build + export, returning the snapshot tree as a plain JS object,
/// or a JSON array of error objects.
#[wasm_bindgen]
pub fn snapshot_definition(json: &str) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let result = match crate::parse::parse_and_build(json) {
        Ok(pipeline) => export::export_pipeline(&pipeline).serialize(&serializer),
        Err(errors) => errors
            .into_iter()
            .map(ErrorDto::from)
            .collect::<Vec<_>>()
            .serialize(&serializer),
    };
    result.unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDto {
    pub code: String,
    pub phase: String,
    pub message: String,
    pub node_id: Option<String>,
}

impl From<ExportError> for ErrorDto {
    fn from(e: ExportError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "value")]
pub enum ExportResult {
    #[serde(rename = "success")]
    Success(String),
    #[serde(rename = "errors")]
    Errors(Vec<ErrorDto>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_reports_parse_error() {
        match export_definition_result("{") {
            ExportResult::Errors(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, "P001");
                assert_eq!(errors[0].phase, "Parse");
            }
            ExportResult::Success(_) => panic!("expected errors"),
        }
    }

    #[test]
    fn valid_definition_exports() {
        let json = r#"{"root": "main", "dags": {"main": {"nodes": [{"id": "only"}]}}}"#;
        match export_definition_result(json) {
            ExportResult::Success(definition) => {
                assert!(definition.contains("\"is-valid\": true"));
            }
            ExportResult::Errors(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }

    #[test]
    fn result_serializes_status_and_value() {
        let success = serde_json::to_value(ExportResult::Success("{}".into())).unwrap();
        assert_eq!(success, serde_json::json!({"status": "success", "value": "{}"}));

        let errors = serde_json::to_value(export_definition_result("{")).unwrap();
        assert_eq!(errors["status"], "errors");
        assert_eq!(errors["value"][0]["code"], "P001");
    }
}
