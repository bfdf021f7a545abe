//! Defines the command-line arguments of an Assay test runner.
//!
//! Embedders call [`crate::cli::run`] from their own `main`; these are the
//! arguments that binary understands. Values given here override the
//! environment (see [`crate::cli::config`]).

use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "assay",
    version,
    about = "Runs registered unit tests and captures library assertions as failures."
)]
pub struct RunnerArgs {
    /// Only run tests carrying one of these tags (comma or space separated).
    #[arg(short, long, value_name = "TAGS")]
    pub include: Option<String>,

    /// Skip tests carrying any of these tags. Wins over --include.
    #[arg(short, long, value_name = "TAGS")]
    pub exclude: Option<String>,

    /// Trap into the debugger on every captured library assertion.
    #[arg(long)]
    pub assertion_breakpoint: bool,

    /// Trap into the debugger whenever a test fails.
    #[arg(long)]
    pub incident_breakpoint: bool,

    /// List the selected tests without running them.
    #[arg(short, long)]
    pub list: bool,

    /// Print the full test log as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}
