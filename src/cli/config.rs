//! Runner configuration.
//!
//! Built from the environment first, then overridden by [`RunnerArgs`].

use termcolor::ColorChoice;

use crate::cli::args::RunnerArgs;
use crate::diagnostics::{AssayError, AssayResult};

pub const ENV_INCLUDE: &str = "ASSAY_INCLUDE";
pub const ENV_EXCLUDE: &str = "ASSAY_EXCLUDE";
pub const ENV_ASSERTION_BREAKPOINT: &str = "ASSAY_ASSERTION_BREAKPOINT";
pub const ENV_INCIDENT_BREAKPOINT: &str = "ASSAY_INCIDENT_BREAKPOINT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub included: String,
    pub excluded: String,
    pub assertion_breakpoint: bool,
    pub incident_breakpoint: bool,
    pub use_colors: bool,
    pub json: bool,
    pub list_only: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            included: String::new(),
            excluded: String::new(),
            assertion_breakpoint: false,
            incident_breakpoint: false,
            use_colors: atty::is(atty::Stream::Stdout),
            json: false,
            list_only: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> AssayResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(AssayError::config(
            key,
            value,
            "expected one of 1/0, true/false, yes/no, on/off",
        )),
    }
}

impl RunnerConfig {
    /// Reads the `ASSAY_*` environment variables.
    pub fn from_env() -> AssayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AssayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(included) = lookup(ENV_INCLUDE) {
            config.included = included;
        }
        if let Some(excluded) = lookup(ENV_EXCLUDE) {
            config.excluded = excluded;
        }
        if let Some(value) = lookup(ENV_ASSERTION_BREAKPOINT) {
            config.assertion_breakpoint = parse_bool(ENV_ASSERTION_BREAKPOINT, &value)?;
        }
        if let Some(value) = lookup(ENV_INCIDENT_BREAKPOINT) {
            config.incident_breakpoint = parse_bool(ENV_INCIDENT_BREAKPOINT, &value)?;
        }
        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn apply_args(mut self, args: &RunnerArgs) -> Self {
        if let Some(included) = &args.include {
            self.included = included.clone();
        }
        if let Some(excluded) = &args.exclude {
            self.excluded = excluded.clone();
        }
        self.assertion_breakpoint |= args.assertion_breakpoint;
        self.incident_breakpoint |= args.incident_breakpoint;
        self.list_only |= args.list;
        self.json |= args.json;
        if args.no_color {
            self.use_colors = false;
        }
        self
    }

    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_values_are_permissive_about_spelling() {
        for value in ["1", "true", "YES", " on "] {
            assert!(parse_bool("KEY", value).unwrap());
        }
        for value in ["0", "false", "No", "off", ""] {
            assert!(!parse_bool("KEY", value).unwrap());
        }
        assert!(parse_bool("KEY", "maybe").is_err());
    }
}
