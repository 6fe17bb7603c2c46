use anyhow::Result;
use molecule_core::{read_manifest, BaseLayout, Manifest, ManifestEntry};

use crate::{InstallStatus, PackageInstaller};

/// Running totals for one restore invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreCounts {
    pub completed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub total: usize,
}

impl RestoreCounts {
    pub fn processed(&self) -> usize {
        self.completed + self.errored + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Installed,
    Failed { reason: String },
    SkippedMalformed,
}

/// Receives each entry's disposition as the restore advances.
pub trait RestoreObserver {
    fn entry_started(&mut self, _position: usize, _name: &str) {}

    fn entry_finished(
        &mut self,
        position: usize,
        name: Option<&str>,
        outcome: &RestoreOutcome,
        counts: &RestoreCounts,
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub counts: RestoreCounts,
    pub outcomes: Vec<RestoreOutcome>,
}

impl RestoreReport {
    pub fn has_errors(&self) -> bool {
        self.counts.errored > 0
    }
}

/// Checks restore preconditions and loads the manifest.
///
/// Nothing is installed if this fails.
pub fn load_restore_manifest(layout: &BaseLayout) -> Result<Manifest> {
    layout.ensure_base_dir()?;
    layout.ensure_manifest_file()?;
    read_manifest(&layout.manifest_path())
}

/// Installs every manifest entry in order, one at a time.
///
/// Failures are counted, never retried, and never stop the loop.
pub fn restore_manifest(
    manifest: &Manifest,
    installer: &dyn PackageInstaller,
    observer: &mut dyn RestoreObserver,
) -> RestoreReport {
    let mut counts = RestoreCounts {
        total: manifest.len(),
        ..RestoreCounts::default()
    };
    let mut outcomes = Vec::with_capacity(manifest.len());

    for (position, entry) in manifest.entries().iter().enumerate() {
        let outcome = match entry {
            ManifestEntry::Malformed => {
                counts.skipped += 1;
                RestoreOutcome::SkippedMalformed
            }
            ManifestEntry::Package { name, .. } => {
                observer.entry_started(position, name);
                let outcome = install_one(installer, name);
                match outcome {
                    RestoreOutcome::Installed => counts.completed += 1,
                    _ => counts.errored += 1,
                }
                outcome
            }
        };

        observer.entry_finished(position, entry.name(), &outcome, &counts);
        outcomes.push(outcome);
    }

    RestoreReport { counts, outcomes }
}

fn install_one(installer: &dyn PackageInstaller, name: &str) -> RestoreOutcome {
    match installer.install(name) {
        Ok(InstallStatus::Succeeded) => RestoreOutcome::Installed,
        Ok(InstallStatus::Failed { code: Some(code) }) => RestoreOutcome::Failed {
            reason: format!("installer exited with status {code}"),
        },
        Ok(InstallStatus::Failed { code: None }) => RestoreOutcome::Failed {
            reason: "installer was terminated by a signal".to_string(),
        },
        Err(err) => RestoreOutcome::Failed {
            reason: format!("{err:#}"),
        },
    }
}
