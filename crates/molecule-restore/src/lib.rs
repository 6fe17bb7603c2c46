mod executor;
mod installer;

pub use executor::{
    load_restore_manifest, restore_manifest, RestoreCounts, RestoreObserver, RestoreOutcome,
    RestoreReport,
};
pub use installer::{
    resolve_installer_program, CommandInstaller, InstallOutput, InstallStatus, PackageInstaller,
    DEFAULT_INSTALLER, INSTALLER_ENV,
};
