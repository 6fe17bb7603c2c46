use anyhow::Result;
use molecule_core::{default_base_dir, BaseLayout};
use molecule_restore::{InstallOutput, DEFAULT_INSTALLER, INSTALLER_ENV};
use std::path::PathBuf;

use crate::render::{current_output_style, OutputStyle};
use crate::Cli;

/// Settings for one invocation, fixed once flags and environment are read.
#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    pub(crate) layout: BaseLayout,
    pub(crate) include_disabled: bool,
    pub(crate) silent: bool,
    pub(crate) installer: PathBuf,
    pub(crate) style: OutputStyle,
}

impl RunConfig {
    pub(crate) fn from_cli(cli: &Cli, installer: PathBuf) -> Result<Self> {
        let base = match &cli.base_dir {
            Some(base) => base.clone(),
            None => default_base_dir()?,
        };

        Ok(Self {
            layout: BaseLayout::new(base),
            include_disabled: cli.include_disabled,
            silent: cli.silent,
            installer,
            style: current_output_style(),
        })
    }

    pub(crate) fn install_output(&self) -> InstallOutput {
        if self.silent {
            InstallOutput::Discard
        } else {
            InstallOutput::Inherit
        }
    }
}

pub(crate) fn installer_program_name() -> String {
    std::env::var(INSTALLER_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_INSTALLER.to_string())
}
