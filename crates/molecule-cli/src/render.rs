use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use molecule_restore::{RestoreCounts, RestoreObserver, RestoreOutcome, RestoreReport};

const TAG: &str = "[molecule]";
const ERROR_TAG: &str = "[molecule error]";
const PROGRESS_WIDTH: usize = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool, no_color: bool) -> OutputStyle {
    if stdout_is_tty && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    )
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn style(self) -> OutputStyle {
        self.style
    }

    /// `err` lines go to stderr, everything else to stdout.
    pub(crate) fn print_status(self, status: &str, message: &str) {
        let line = render_status_line(self.style, status, message);
        if status == "err" {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    let tag = if status == "err" { ERROR_TAG } else { TAG };
    let line = format!("{tag} {message}");
    match style {
        OutputStyle::Plain => line,
        OutputStyle::Rich => colorize(status_style(status), &line),
    }
}

pub(crate) fn render_progress_line(style: OutputStyle, counts: &RestoreCounts) -> String {
    let safe_total = counts.total.max(1);
    let processed = counts.processed().min(safe_total);
    let filled = (processed * PROGRESS_WIDTH) / safe_total;
    let bar = format!(
        "{}{}",
        "=".repeat(filled),
        "-".repeat(PROGRESS_WIDTH.saturating_sub(filled))
    );
    let position = format!(
        "{}/{}",
        HumanCount(counts.processed() as u64),
        HumanCount(counts.total as u64)
    );
    let errors = format!("{} error(s)", HumanCount(counts.errored as u64));

    match style {
        OutputStyle::Plain => format!("  [{bar}] {position} {errors}"),
        OutputStyle::Rich => format!(
            "  [{}] {} {}",
            colorize(status_style("warn"), &bar),
            colorize(status_style("warn"), &position),
            colorize(status_style("err"), &errors)
        ),
    }
}

pub(crate) fn format_restore_summary(report: &RestoreReport) -> Vec<(&'static str, String)> {
    let counts = &report.counts;
    let status = if report.has_errors() { "warn" } else { "ok" };
    let failed_noun = if counts.errored == 1 {
        "package"
    } else {
        "packages"
    };
    let mut lines = vec![(
        status,
        format!(
            "Restored {}/{} packages. {} {failed_noun} failed.",
            counts.completed, counts.total, counts.errored
        ),
    )];
    if counts.skipped > 0 {
        let noun = if counts.skipped == 1 {
            "entry"
        } else {
            "entries"
        };
        lines.push(("warn", format!("Skipped {} malformed manifest {noun}.", counts.skipped)));
    }
    lines.push((status, "Restore complete!".to_string()));
    lines
}

/// Per-entry progress for a restore run.
///
/// Verbose runs print one static line per entry so the installer's own output
/// stays readable; silent runs redraw a single bar in place, and only when
/// stdout is a terminal.
pub(crate) struct RestoreProgress {
    renderer: TerminalRenderer,
    silent: bool,
    progress_bar: Option<ProgressBar>,
}

impl RestoreProgress {
    pub(crate) fn start(renderer: TerminalRenderer, silent: bool, total: usize) -> Self {
        let progress_bar = if silent && renderer.style() == OutputStyle::Rich {
            let progress_bar = ProgressBar::new(total.max(1) as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "  [{bar:30.yellow.bold}] {pos}/{len} {msg:.red.bold} {elapsed_precise}",
            ) {
                progress_bar.set_style(style.progress_chars("=>-"));
            }
            progress_bar.set_message("0 error(s)");
            progress_bar.enable_steady_tick(Duration::from_millis(120));
            Some(progress_bar)
        } else {
            None
        };

        Self {
            renderer,
            silent,
            progress_bar,
        }
    }

    pub(crate) fn finish(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }

    fn report(&self, status: &str, message: &str) {
        match &self.progress_bar {
            Some(progress_bar) => progress_bar.suspend(|| self.renderer.print_status(status, message)),
            None => self.renderer.print_status(status, message),
        }
    }
}

impl RestoreObserver for RestoreProgress {
    fn entry_started(&mut self, _position: usize, name: &str) {
        if !self.silent {
            self.renderer
                .print_status("info", &format!("installing {name}"));
        }
    }

    fn entry_finished(
        &mut self,
        position: usize,
        name: Option<&str>,
        outcome: &RestoreOutcome,
        counts: &RestoreCounts,
    ) {
        match outcome {
            RestoreOutcome::Installed => {}
            RestoreOutcome::Failed { reason } => self.report(
                "err",
                &format!("{} failed to install: {reason}", name.unwrap_or("package")),
            ),
            RestoreOutcome::SkippedMalformed => self.report(
                "err",
                &format!(
                    "package is malformed. skipping package. (manifest entry {})",
                    position + 1
                ),
            ),
        }

        match &self.progress_bar {
            Some(progress_bar) => {
                progress_bar.set_position(counts.processed() as u64);
                progress_bar.set_message(format!("{} error(s)", counts.errored));
            }
            None if !self.silent => {
                println!("{}", render_progress_line(self.renderer.style(), counts));
            }
            None => {}
        }
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::Green,
        "warn" => AnsiColor::Yellow,
        "err" => AnsiColor::Red,
        _ => AnsiColor::White,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
