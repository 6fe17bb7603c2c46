use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::MoleculeError;

pub const BASE_DIR_ENV: &str = "MOLECULE_BASE_DIR";

const MANIFEST_FILE: &str = "manifest.json";
const CONFIG_FILE: &str = "config.toml";
pub(crate) const DESCRIPTOR_FILE: &str = "package.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseLayout {
    base: PathBuf,
}

impl BaseLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.base.join("packages")
    }

    pub fn descriptor_path(&self, package_dir: &str) -> PathBuf {
        self.packages_dir().join(package_dir).join(DESCRIPTOR_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.base.join(MANIFEST_FILE)
    }

    pub fn ensure_base_dir(&self) -> Result<()> {
        if !self.base.is_dir() {
            return Err(MoleculeError::MissingDirectory {
                path: self.base.clone(),
            }
            .into());
        }
        Ok(())
    }

    pub fn ensure_manifest_file(&self) -> Result<()> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Err(MoleculeError::MissingManifest { path }.into());
        }
        Ok(())
    }
}

pub fn default_base_dir() -> Result<PathBuf> {
    if let Some(base) = std::env::var_os(BASE_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base));
    }

    if cfg!(windows) {
        let profile = std::env::var("USERPROFILE")
            .context("USERPROFILE is not set; cannot resolve Windows base directory")?;
        return Ok(PathBuf::from(profile).join(".atom"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve base directory")?;
    Ok(PathBuf::from(home).join(".atom"))
}
