use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::DESCRIPTOR_FILE;
use crate::{DisabledPackages, MoleculeError, PackageRecord};

/// A descriptor file that parsed as JSON.
///
/// `record` is `None` when the descriptor lacks a `name` or `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDescriptor {
    pub path: PathBuf,
    pub record: Option<PackageRecord>,
}

/// Lazy walk over `<packages_root>/*/package.json` in directory order.
///
/// Yields an error for the first descriptor that is not valid JSON; callers
/// treat that as the end of the scan.
pub struct DescriptorScan {
    root: PathBuf,
    entries: Option<fs::ReadDir>,
}

pub fn scan_descriptors(packages_root: &Path) -> Result<DescriptorScan> {
    if !packages_root.exists() {
        return Ok(DescriptorScan {
            root: packages_root.to_path_buf(),
            entries: None,
        });
    }

    let entries = fs::read_dir(packages_root).with_context(|| {
        format!(
            "failed to read packages directory: {}",
            packages_root.display()
        )
    })?;
    Ok(DescriptorScan {
        root: packages_root.to_path_buf(),
        entries: Some(entries),
    })
}

impl DescriptorScan {
    fn next_descriptor_path(&mut self) -> Option<Result<PathBuf>> {
        let entries = self.entries.as_mut()?;
        for entry in entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    return Some(Err(err).with_context(|| {
                        format!("failed to read packages directory: {}", self.root.display())
                    }))
                }
            };

            // is_dir follows symlinks, which covers linked development packages
            let package_dir = entry.path();
            if !package_dir.is_dir() {
                continue;
            }
            let descriptor = package_dir.join(DESCRIPTOR_FILE);
            if descriptor.is_file() {
                return Some(Ok(descriptor));
            }
        }
        None
    }
}

impl Iterator for DescriptorScan {
    type Item = Result<ScannedDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = match self.next_descriptor_path()? {
            Ok(path) => path,
            Err(err) => return Some(Err(err)),
        };
        Some(read_descriptor(path))
    }
}

fn read_descriptor(path: PathBuf) -> Result<ScannedDescriptor> {
    let raw = fs::read(&path)
        .with_context(|| format!("failed to read package descriptor: {}", path.display()))?;
    let descriptor: serde_json::Value = match serde_json::from_slice(&raw) {
        Ok(value) => value,
        Err(source) => return Err(MoleculeError::MalformedJson { path, source }.into()),
    };

    Ok(ScannedDescriptor {
        record: PackageRecord::from_descriptor(&descriptor),
        path,
    })
}

/// Drains a scan into manifest order, dropping incomplete and disabled packages.
///
/// Any descriptor error aborts the whole collection; no partial manifest is
/// returned.
pub fn collect_manifest(
    scan: impl IntoIterator<Item = Result<ScannedDescriptor>>,
    disabled: Option<&DisabledPackages>,
) -> Result<Vec<PackageRecord>> {
    let mut records = Vec::new();
    for scanned in scan {
        let Some(record) = scanned?.record else {
            continue;
        };
        if disabled.is_some_and(|disabled| disabled.contains(&record.name)) {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}
