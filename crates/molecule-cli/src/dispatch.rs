use anyhow::Result;
use clap::CommandFactory;
use molecule_core::{collect_manifest, load_disabled_packages, scan_descriptors, write_manifest};
use molecule_restore::{
    load_restore_manifest, resolve_installer_program, restore_manifest, CommandInstaller,
    RestoreReport,
};

use crate::config::{installer_program_name, RunConfig};
use crate::render::{format_restore_summary, RestoreProgress, TerminalRenderer};
use crate::{Cli, CliAction};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    // the installer is a hard dependency of every command, usage included
    let program = installer_program_name();
    let installer = resolve_installer_program(&program, std::env::var_os("PATH").as_deref())?;

    match cli.action() {
        CliAction::Help | CliAction::Usage => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
        CliAction::Backup => {
            run_backup(&RunConfig::from_cli(&cli, installer)?)?;
            Ok(())
        }
        CliAction::Restore => {
            run_restore(&RunConfig::from_cli(&cli, installer)?)?;
            Ok(())
        }
    }
}

pub(crate) fn run_backup(config: &RunConfig) -> Result<usize> {
    let renderer = TerminalRenderer::from_style(config.style);
    let layout = &config.layout;
    layout.ensure_base_dir()?;

    let disabled = match load_disabled_packages(config.include_disabled, &layout.config_path()) {
        Ok(disabled) => disabled,
        Err(err) => {
            renderer.print_status("err", &format!("{err}; backing up all packages"));
            None
        }
    };
    if let Some(disabled) = disabled.as_ref().filter(|disabled| !disabled.is_empty()) {
        renderer.print_status(
            "warn",
            &format!(
                "skipping disabled packages: {}",
                disabled.names().join(", ")
            ),
        );
    }

    let manifest_path = layout.manifest_path();
    renderer.print_status(
        "ok",
        &format!("Backing up packages to {}", manifest_path.display()),
    );

    let scan = scan_descriptors(&layout.packages_dir())?;
    let records = collect_manifest(scan, disabled.as_ref())?;
    write_manifest(&manifest_path, &records)?;

    renderer.print_status("info", &format!("{} packages written", records.len()));
    renderer.print_status("ok", "Backup complete!");
    Ok(records.len())
}

pub(crate) fn run_restore(config: &RunConfig) -> Result<RestoreReport> {
    let renderer = TerminalRenderer::from_style(config.style);
    let layout = &config.layout;
    renderer.print_status(
        "ok",
        &format!(
            "Restoring packages from {}",
            layout.manifest_path().display()
        ),
    );

    let manifest = load_restore_manifest(layout)?;
    println!();
    println!("  {} packages to install", manifest.len());
    println!();

    let installer = CommandInstaller::new(&config.installer, config.install_output());
    let mut progress = RestoreProgress::start(renderer, config.silent, manifest.len());
    let report = restore_manifest(&manifest, &installer, &mut progress);
    progress.finish();

    for (status, line) in format_restore_summary(&report) {
        renderer.print_status(status, &line);
    }
    Ok(report)
}
