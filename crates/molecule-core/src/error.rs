use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy shared by backup and restore.
///
/// Everything except [`MoleculeError::MalformedConfig`] is fatal to the
/// running command; the disabled-package configuration is optional and its
/// load errors are reported and then ignored.
#[derive(Debug, Error)]
pub enum MoleculeError {
    #[error("{program} is required to be installed and on PATH")]
    MissingDependency { program: String },

    #[error("base directory not found at {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("manifest not found at {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("failed JSON parsing at {}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package restore expects manifest to be an array (found {found}) at {}", path.display())]
    MalformedManifestShape { path: PathBuf, found: &'static str },

    #[error("could not load disabled packages from {}: {reason}", path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_json::Error),
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
