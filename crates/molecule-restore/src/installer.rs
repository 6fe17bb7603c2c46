use anyhow::{Context, Result};
use molecule_core::MoleculeError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_INSTALLER: &str = "apm";
pub const INSTALLER_ENV: &str = "MOLECULE_INSTALLER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Succeeded,
    Failed { code: Option<i32> },
}

/// Where the installer's own stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutput {
    Inherit,
    Discard,
}

/// Installs one package by name.
///
/// An `Err` means the installer could not be run at all; a run that exits
/// non-zero is `Ok(InstallStatus::Failed { .. })`.
pub trait PackageInstaller {
    fn install(&self, name: &str) -> Result<InstallStatus>;
}

/// Runs `<program> install <name>` and waits for it.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    program: PathBuf,
    output: InstallOutput,
}

impl CommandInstaller {
    pub fn new(program: impl Into<PathBuf>, output: InstallOutput) -> Self {
        Self {
            program: program.into(),
            output,
        }
    }

    pub(crate) fn install_command(&self, name: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("install").arg(name).stdin(Stdio::null());
        if self.output == InstallOutput::Discard {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command
    }
}

impl PackageInstaller for CommandInstaller {
    fn install(&self, name: &str) -> Result<InstallStatus> {
        let status = self.install_command(name).status().with_context(|| {
            format!(
                "failed launching {} install {}",
                self.program.display(),
                name
            )
        })?;
        if status.success() {
            Ok(InstallStatus::Succeeded)
        } else {
            Ok(InstallStatus::Failed {
                code: status.code(),
            })
        }
    }
}

/// Finds the installer executable, either as a literal path or on `path_var`.
pub fn resolve_installer_program(program: &str, path_var: Option<&OsStr>) -> Result<PathBuf> {
    let missing = || MoleculeError::MissingDependency {
        program: program.to_string(),
    };

    let literal = Path::new(program);
    if literal.components().count() > 1 {
        if is_executable(literal) {
            return Ok(literal.to_path_buf());
        }
        return Err(missing().into());
    }

    let Some(path_var) = path_var else {
        return Err(missing().into());
    };
    for dir in std::env::split_paths(path_var) {
        for candidate in executable_candidates(&dir, program) {
            if is_executable(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(missing().into())
}

fn executable_candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    let mut candidates = vec![dir.join(program)];
    if cfg!(windows) {
        for extension in ["exe", "cmd", "bat"] {
            candidates.push(dir.join(format!("{program}.{extension}")));
        }
    }
    candidates
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
