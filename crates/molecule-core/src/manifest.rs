use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::json_kind;
use crate::record::non_empty_str;
use crate::{MoleculeError, PackageRecord};

/// One position of a persisted manifest array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    Package {
        name: String,
        version: Option<String>,
        repo: Option<String>,
    },
    /// `null`, a non-object, or an object without a usable `name`.
    Malformed,
}

impl ManifestEntry {
    fn from_value(value: &Value) -> Self {
        let Some(name) = non_empty_str(value.get("name")) else {
            return Self::Malformed;
        };
        Self::Package {
            name: name.to_string(),
            version: value
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
            repo: value.get("repo").and_then(Value::as_str).map(str::to_string),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Package { name, .. } => Some(name),
            Self::Malformed => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Complete records in manifest order; entries without a version are left out.
    pub fn records(&self) -> Vec<PackageRecord> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ManifestEntry::Package {
                    name,
                    version: Some(version),
                    repo,
                } => Some(PackageRecord::new(name.clone(), version.clone(), repo.clone())),
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }
}

pub fn encode_manifest(records: &[PackageRecord]) -> Result<String> {
    let mut payload = serde_json::to_string_pretty(records).map_err(MoleculeError::Serialize)?;
    payload.push('\n');
    Ok(payload)
}

pub fn write_manifest(path: &Path, records: &[PackageRecord]) -> Result<()> {
    let payload = encode_manifest(records)?;
    fs::write(path, payload.as_bytes())
        .with_context(|| format!("failed to write manifest: {}", path.display()))
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(MoleculeError::MissingManifest {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read manifest: {}", path.display()))
        }
    };
    parse_manifest(&raw, path)
}

pub fn parse_manifest(raw: &[u8], path: &Path) -> Result<Manifest> {
    let document: Value = serde_json::from_slice(raw).map_err(|source| {
        MoleculeError::MalformedJson {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let values = match document {
        Value::Array(values) => values,
        other => {
            return Err(MoleculeError::MalformedManifestShape {
                path: path.to_path_buf(),
                found: json_kind(&other),
            }
            .into())
        }
    };

    Ok(values
        .iter()
        .map(ManifestEntry::from_value)
        .collect::<Vec<_>>()
        .into())
}
