use crate::{
    bundle::{SpecBundle, load_spec_bundle},
    error::{ErrorLocation, SpecError},
    lint::{FlowIssue, diagnose_spec, diagnose_step_flows},
    registry::RouteIndex,
};
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_pointer: Option<String>,
}

impl JsonDiagnostic {
    pub fn from_location(message: String, location: ErrorLocation) -> Self {
        let ErrorLocation {
            label,
            source_path,
            line,
            col,
            pointer,
        } = location;
        JsonDiagnostic {
            message,
            source_path: source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .or(label),
            line,
            col,
            json_pointer: pointer,
        }
    }
}

/// Machine-readable payload of `flowspec doctor --json`.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DoctorJsonOutput {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_blake3: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FlowIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonDiagnostic>,
}

impl DoctorJsonOutput {
    pub fn success(bundle: &SpecBundle, issues: Vec<FlowIssue>) -> Self {
        DoctorJsonOutput {
            ok: true,
            hash_blake3: Some(bundle.hash_blake3.clone()),
            warnings: bundle.warnings.clone(),
            issues,
            errors: Vec::new(),
        }
    }

    pub fn error(err: SpecError) -> Self {
        let message = err.to_string();
        DoctorJsonOutput {
            ok: false,
            hash_blake3: None,
            warnings: Vec::new(),
            issues: Vec::new(),
            errors: vec![JsonDiagnostic::from_location(message, err.into_location())],
        }
    }

    pub fn into_string(self) -> String {
        serde_json::to_string(&self).expect("doctor output serialization")
    }
}

/// Produce the JSON emitted by `flowspec doctor --json` for one document.
pub fn doctor_to_json(text: &str, route_index: Option<&RouteIndex>) -> DoctorJsonOutput {
    match load_spec_bundle(text, None) {
        Ok(bundle) => {
            let mut issues = diagnose_spec(&bundle.spec, route_index);
            issues.extend(diagnose_step_flows(&bundle.spec.nodes, &bundle.spec.edges));
            DoctorJsonOutput::success(&bundle, issues)
        }
        Err(err) => DoctorJsonOutput::error(err),
    }
}
