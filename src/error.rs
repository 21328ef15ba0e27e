use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a fatal parse error came from: source label/path, optional
/// line/column from the JSON parser and an optional JSON pointer into the
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    pub label: Option<String>,
    pub source_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub col: Option<usize>,
    pub pointer: Option<String>,
}

impl ErrorLocation {
    pub fn at(label: impl Into<String>) -> Self {
        ErrorLocation {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn with_source_path(mut self, path: Option<&Path>) -> Self {
        self.source_path = path.map(Path::to_path_buf);
        self
    }

    pub fn with_position(mut self, line: usize, col: usize) -> Self {
        self.line = Some(line);
        self.col = Some(col);
        self
    }

    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    /// Human-readable `label:line:col` (or `label/pointer`) form.
    pub fn describe(&self) -> Option<String> {
        let label = self.label.as_deref()?;
        match (self.line, self.col) {
            (Some(line), Some(col)) => Some(format!("{label}:{line}:{col}")),
            _ => match &self.pointer {
                Some(pointer) => Some(format!("{label}{pointer}")),
                None => Some(label.to_string()),
            },
        }
    }
}

/// Fatal failures of the spec normalizer. Everything not listed here is
/// recoverable and surfaces as a warning on the normalized spec instead.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("flow spec is empty")]
    EmptyDocument { location: ErrorLocation },
    #[error("flow spec cannot be read as JSON: {message}")]
    Json {
        message: String,
        location: ErrorLocation,
    },
    #[error("flow spec root must be a JSON object")]
    MissingRoot { location: ErrorLocation },
    #[error("flow spec has no \"{field}\" array")]
    MissingCollection {
        field: &'static str,
        location: ErrorLocation,
    },
    #[error("node entry at index {index} is not an object")]
    NodeShape {
        index: usize,
        location: ErrorLocation,
    },
    #[error("node '{node_id}' has no valid position")]
    NodePosition {
        node_id: String,
        location: ErrorLocation,
    },
    #[error("edge entry at index {index} is not an object")]
    EdgeShape {
        index: usize,
        location: ErrorLocation,
    },
    #[error("edge '{edge_ref}' is missing its source/target")]
    EdgeEndpoints {
        edge_ref: String,
        location: ErrorLocation,
    },
    #[error("failed to read flow spec: {message}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
    #[error("internal error: {message}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl SpecError {
    pub fn location(&self) -> &ErrorLocation {
        match self {
            SpecError::EmptyDocument { location }
            | SpecError::Json { location, .. }
            | SpecError::MissingRoot { location }
            | SpecError::MissingCollection { location, .. }
            | SpecError::NodeShape { location, .. }
            | SpecError::NodePosition { location, .. }
            | SpecError::EdgeShape { location, .. }
            | SpecError::EdgeEndpoints { location, .. }
            | SpecError::Io { location, .. }
            | SpecError::Internal { location, .. } => location,
        }
    }

    pub fn into_location(self) -> ErrorLocation {
        match self {
            SpecError::EmptyDocument { location }
            | SpecError::Json { location, .. }
            | SpecError::MissingRoot { location }
            | SpecError::MissingCollection { location, .. }
            | SpecError::NodeShape { location, .. }
            | SpecError::NodePosition { location, .. }
            | SpecError::EdgeShape { location, .. }
            | SpecError::EdgeEndpoints { location, .. }
            | SpecError::Io { location, .. }
            | SpecError::Internal { location, .. } => location,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpecError>;
