//! treecopy: copy a directory tree with filters and report run statistics.

mod cli;
mod state;

use std::process::ExitCode;
use std::time::SystemTime;

use anyhow::Result;
use clap::Parser;
use treecopy_fs::{EnumVerbosity, copy_tree, write_line};

use crate::cli::Cli;
use crate::state::{SpecRunState, load_state, save_state};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            write_line(&format!("{e:#}"), EnumVerbosity::Always);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(n_verbosity: u8) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = EnumVerbosity::from_setting(n_verbosity).level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let time_started = SystemTime::now();
    let mut spec_cp_options = cli.to_copy_options();

    if cli.incremental
        && let Some(path_state) = cli.state_file.as_deref()
    {
        match load_state(path_state)? {
            Some(spec_state) => {
                write_line(
                    &format!(
                        "Incremental copy of files modified since {} (unix seconds)",
                        spec_state.started_at_unix
                    ),
                    EnumVerbosity::Normal,
                );
                spec_cp_options.modified_since = Some(spec_state.started_at());
            }
            None => write_line(
                &format!(
                    "No state file at {}; copying everything.",
                    path_state.display()
                ),
                EnumVerbosity::UnlessSilent,
            ),
        }
    }

    match copy_tree(&cli.source, &cli.destination, spec_cp_options) {
        Ok(report) => {
            write_line(&report.format("Done."), EnumVerbosity::Always);
            if let Some(path_state) = cli.state_file.as_deref() {
                save_state(path_state, &SpecRunState::new(&cli.source, time_started))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(abort) => {
            write_line(&abort.error.to_string(), EnumVerbosity::Always);
            write_line(&abort.report.format("Stopped."), EnumVerbosity::Always);
            Ok(ExitCode::FAILURE)
        }
    }
}
