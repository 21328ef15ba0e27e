//! Flow graph specification loading, normalization and structural
//! diagnostics: untrusted JSON in, a typed [`model::FlowSpec`] plus
//! [`lint::FlowIssue`]s out.
#![forbid(unsafe_code)]

pub mod bundle;
pub mod chunks;
pub mod error;
pub mod journeys;
pub mod json_output;
pub mod lint;
pub mod loader;
pub mod model;
pub mod registry;
mod util;

pub use bundle::SpecBundle;
pub use error::{ErrorLocation, Result, SpecError};
pub use lint::{FlowIssue, Severity, TargetKind, diagnose, diagnose_spec};
pub use model::{FlowSpec, NormalizedSpec};

use std::path::Path;

/// Load a flow spec from JSON text and return a hashed bundle.
pub fn load_and_validate(spec_json: &str) -> Result<SpecBundle> {
    bundle::load_spec_bundle(spec_json, None)
}

/// Same as [`load_and_validate`] but labels error locations with the source
/// path.
pub fn load_and_validate_with_source(spec_json: &str, source: &Path) -> Result<SpecBundle> {
    bundle::load_spec_bundle(spec_json, Some(source))
}
