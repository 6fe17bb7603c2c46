use std::fs;
use std::io;
use std::path::Path;

use crate::MoleculeError;

/// Package names excluded from backup, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledPackages {
    names: Vec<String>,
}

impl DisabledPackages {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|disabled| disabled == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves the disabled-package snapshot for one backup run.
///
/// `Ok(None)` means no filtering. An `Err` is always
/// [`MoleculeError::MalformedConfig`]; callers report it and continue
/// without filtering.
pub fn load_disabled_packages(
    include_disabled: bool,
    config_path: &Path,
) -> Result<Option<DisabledPackages>, MoleculeError> {
    if include_disabled {
        return Ok(None);
    }

    let raw = match fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(err) => {
            let reason = if err.kind() == io::ErrorKind::NotFound {
                "file not found".to_string()
            } else {
                err.to_string()
            };
            return Err(MoleculeError::MalformedConfig {
                path: config_path.to_path_buf(),
                reason,
            });
        }
    };

    parse_disabled_packages(&raw, config_path)
}

/// Extracts `["*".core] disabledPackages` from a TOML configuration document.
pub fn parse_disabled_packages(
    raw: &str,
    config_path: &Path,
) -> Result<Option<DisabledPackages>, MoleculeError> {
    let config: toml::Table = toml::from_str(raw).map_err(|err| MoleculeError::MalformedConfig {
        path: config_path.to_path_buf(),
        reason: err.to_string().trim().to_string(),
    })?;

    let Some(entries) = config
        .get("*")
        .and_then(|scope| scope.get("core"))
        .and_then(|core| core.get("disabledPackages"))
        .and_then(toml::Value::as_array)
    else {
        return Ok(None);
    };

    Ok(Some(DisabledPackages::new(
        entries.iter().filter_map(toml::Value::as_str),
    )))
}
