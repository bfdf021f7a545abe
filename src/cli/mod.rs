//! The Assay runner entry point.
//!
//! Embedders hand their descriptors to [`run`] from `main`:
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     assay::cli::run(&assay::descriptor::default_tests())
//! }
//! ```

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use termcolor::{StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

use crate::descriptor::UnitTestDescriptor;
use crate::diagnostics::AssayResult;
use crate::manager::TestManager;

pub mod args;
pub mod config;
pub mod output;

pub use args::RunnerArgs;
pub use config::RunnerConfig;

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default `warn`).
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses the process arguments, runs `tests` and maps the outcome to an exit
/// code: success, failure for failed tests, 2 for configuration errors.
pub fn run(tests: &[&'static UnitTestDescriptor]) -> ExitCode {
    init_tracing();
    let args = RunnerArgs::parse();

    let result = RunnerConfig::from_env()
        .map(|config| config.apply_args(&args))
        .and_then(|config| {
            let stdout = StandardStream::stdout(config.color_choice());
            let mut out = stdout.lock();
            run_with_config(&config, tests, &mut out)
        });

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(2)
        }
    }
}

/// Runs `tests` under `config`, writing the report to `out`.
///
/// Returns the aggregate result of the run. Listing mode always succeeds.
pub fn run_with_config<W: WriteColor>(
    config: &RunnerConfig,
    tests: &[&'static UnitTestDescriptor],
    out: &mut W,
) -> AssayResult<bool> {
    let mut manager = TestManager::new();
    manager.add_unit_test_list(tests.iter().copied());
    manager.set_assertion_breakpoint_enabled(config.assertion_breakpoint);
    manager.set_incident_breakpoint_enabled(config.incident_breakpoint);

    if config.list_only {
        let selected = manager.selected_tests(&config.included, &config.excluded);
        output::write_listing(out, &selected)?;
        return Ok(true);
    }

    let passed = manager.run_tests_with_filter(&config.included, &config.excluded);
    let log = manager.tl();
    if config.json {
        writeln!(out, "{}", log.to_json()?)?;
    } else {
        output::write_report(out, &log)?;
    }
    Ok(passed)
}
