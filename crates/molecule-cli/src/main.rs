use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

mod config;
mod dispatch;
mod render;

use dispatch::run_cli;
use render::{current_output_style, render_status_line};

#[derive(Parser, Debug, Default)]
#[command(name = "molecule", disable_help_flag = true)]
#[command(
    about = "Back up and restore installed editor packages",
    long_about = None,
    after_help = "The base directory defaults to ~/.atom (override with --base-dir or MOLECULE_BASE_DIR).\n\
                  Packages are restored with `apm install <name>` (override the installer with MOLECULE_INSTALLER)."
)]
struct Cli {
    /// Back up installed packages to <base>/manifest.json
    #[arg(short = 'b')]
    backup: bool,
    /// Restore packages listed in <base>/manifest.json
    #[arg(short = 'r')]
    restore: bool,
    /// Include disabled packages in the backup
    #[arg(short = 'd')]
    include_disabled: bool,
    /// Silence installer output and per-package progress during restore
    #[arg(short = 's')]
    silent: bool,
    #[arg(long, value_name = "PATH")]
    base_dir: Option<PathBuf>,
    /// Print usage
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    help: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CliAction {
    Backup,
    Restore,
    Help,
    Usage,
}

impl Cli {
    fn action(&self) -> CliAction {
        if self.backup {
            CliAction::Backup
        } else if self.restore {
            CliAction::Restore
        } else if self.help {
            CliAction::Help
        } else {
            CliAction::Usage
        }
    }

    /// Parses `args` (program name first), keeping every recognized flag even
    /// when unknown arguments are mixed in.
    fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = args.into_iter().collect::<Vec<_>>();
        match Self::try_parse_from(args.iter().cloned()) {
            Ok(cli) => cli,
            Err(_) => {
                Self::scan_known_flags(args.into_iter().skip(1).map(Into::<OsString>::into))
            }
        }
    }

    fn scan_known_flags(args: impl Iterator<Item = OsString>) -> Self {
        let mut cli = Self::default();
        let mut args = args.map(|arg| arg.to_string_lossy().into_owned());
        while let Some(arg) = args.next() {
            if arg == "--base-dir" {
                cli.base_dir = args.next().map(PathBuf::from);
            } else if let Some(base_dir) = arg.strip_prefix("--base-dir=") {
                cli.base_dir = Some(PathBuf::from(base_dir));
            } else if arg == "--help" {
                cli.help = true;
            } else if let Some(shorts) = arg
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
            {
                for flag in shorts.chars() {
                    match flag {
                        'b' => cli.backup = true,
                        'r' => cli.restore = true,
                        'd' => cli.include_disabled = true,
                        's' => cli.silent = true,
                        'h' => cli.help = true,
                        _ => {}
                    }
                }
            }
        }
        cli
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse_lenient(std::env::args_os());

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{}",
                render_status_line(current_output_style(), "err", &format!("{err:#}"))
            );
            ExitCode::FAILURE
        }
    }
}
