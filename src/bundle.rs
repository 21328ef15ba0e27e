use crate::{
    error::{ErrorLocation, Result, SpecError},
    loader,
    model::{FlowSpec, NormalizedSpec},
};
use blake3::Hasher;
use serde_json::Value;
use std::path::Path;

const INLINE_SOURCE_LABEL: &str = "<inline>";

/// A normalized spec plus its canonical JSON rendering and content hash,
/// ready to hand to persistence or editor layers.
#[derive(Clone, Debug)]
pub struct SpecBundle {
    pub spec: FlowSpec,
    pub warnings: Vec<String>,
    pub json: Value,
    pub hash_blake3: String,
}

/// Canonicalize a JSON value by sorting object keys recursively.
pub fn canonicalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let mut ordered = serde_json::Map::with_capacity(map.len());
            for key in keys {
                ordered.insert(key.clone(), canonicalize_json(&map[key]));
            }
            Value::Object(ordered)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_json).collect()),
        _ => value.clone(),
    }
}

/// Compute a lowercase hex-encoded BLAKE3 hash for the provided bytes.
pub fn blake3_hex(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes.as_ref());
    hasher.finalize().to_hex().to_string()
}

/// Parse JSON text into a hashed [`SpecBundle`].
pub fn load_spec_bundle(text: &str, source: Option<&Path>) -> Result<SpecBundle> {
    let source_label = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| INLINE_SOURCE_LABEL.to_string());
    let NormalizedSpec { spec, warnings } =
        loader::parse_spec_text_with_source(text, source_label.clone())?;
    bundle_from_normalized(spec, warnings, &source_label, source)
}

fn bundle_from_normalized(
    spec: FlowSpec,
    warnings: Vec<String>,
    source_label: &str,
    source: Option<&Path>,
) -> Result<SpecBundle> {
    let spec_json = serde_json::to_value(&spec).map_err(|e| SpecError::Internal {
        message: format!("spec serialization: {e}"),
        location: ErrorLocation::at(source_label).with_source_path(source),
    })?;
    let canonical = canonicalize_json(&spec_json);
    let bytes = serde_json::to_vec(&canonical).map_err(|e| SpecError::Internal {
        message: format!("canonical json encode: {e}"),
        location: ErrorLocation::at(source_label).with_source_path(source),
    })?;
    let hash_blake3 = blake3_hex(&bytes);
    Ok(SpecBundle {
        spec,
        warnings,
        json: canonical,
        hash_blake3,
    })
}
