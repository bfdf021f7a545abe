#[macro_use]
mod common;

use std::collections::HashMap;

use assay::cli::config::{ENV_ASSERTION_BREAKPOINT, ENV_EXCLUDE, ENV_INCLUDE};
use assay::cli::{run_with_config, RunnerArgs, RunnerConfig};
use assay::{AssayError, ErrorType};
use clap::Parser;
use termcolor::NoColor;

recorded_test!(Tokenizer, TOKENIZER, "parser fast");
recorded_test!(Grammar, GRAMMAR, "parser", fails);
recorded_test!(Storage, STORAGE, "io slow");

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

fn plain_config() -> RunnerConfig {
    RunnerConfig {
        use_colors: false,
        ..RunnerConfig::default()
    }
}

fn render(config: &RunnerConfig) -> (bool, String) {
    let mut out = NoColor::new(Vec::new());
    let passed = run_with_config(config, &[&TOKENIZER, &GRAMMAR, &STORAGE], &mut out).unwrap();
    (passed, String::from_utf8(out.into_inner()).unwrap())
}

#[test]
fn environment_supplies_filters_and_flags() {
    let config = RunnerConfig::from_lookup(lookup(&[
        (ENV_INCLUDE, "parser"),
        (ENV_EXCLUDE, "slow"),
        (ENV_ASSERTION_BREAKPOINT, "yes"),
    ]))
    .unwrap();

    assert_eq!(config.included, "parser");
    assert_eq!(config.excluded, "slow");
    assert!(config.assertion_breakpoint);
    assert!(!config.incident_breakpoint);
}

#[test]
fn malformed_boolean_is_a_config_error() {
    let err = RunnerConfig::from_lookup(lookup(&[(ENV_ASSERTION_BREAKPOINT, "sometimes")]))
        .unwrap_err();

    assert_eq!(err.error_type(), ErrorType::Config);
    match err {
        AssayError::Config { key, value, .. } => {
            assert_eq!(key, ENV_ASSERTION_BREAKPOINT);
            assert_eq!(value, "sometimes");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn arguments_override_the_environment() {
    let config = RunnerConfig::from_lookup(lookup(&[(ENV_INCLUDE, "io"), (ENV_EXCLUDE, "slow")]))
        .unwrap();
    let args = RunnerArgs::try_parse_from(["assay", "-i", "parser", "--list", "--no-color"]).unwrap();
    let config = config.apply_args(&args);

    assert_eq!(config.included, "parser");
    assert_eq!(config.excluded, "slow");
    assert!(config.list_only);
    assert!(!config.use_colors);
}

#[test]
fn listing_does_not_run_anything() {
    let _serial = common::serial();
    let config = RunnerConfig {
        included: "parser".into(),
        list_only: true,
        ..plain_config()
    };

    let (passed, text) = render(&config);
    assert!(passed);
    assert!(common::executed().is_empty());
    assert_eq!(
        text,
        "Tokenizer [fast, parser]\nGrammar [parser]\n2 test(s) selected\n"
    );
}

#[test]
fn report_shows_failures_and_summary() {
    let _serial = common::serial();
    let config = RunnerConfig {
        included: "parser".into(),
        ..plain_config()
    };

    let (passed, text) = render(&config);
    assert!(!passed);
    assert_eq!(common::executed(), ["Tokenizer", "Grammar"]);
    assert!(text.contains("Grammar failed on purpose"));
    assert!(text.contains("Test summary: total 2, passed 1, failed 1, assertions 1"));
    assert!(text.contains("Failed tests:\n  - Grammar\n"));
}

#[test]
fn json_output_carries_the_summary() {
    let _serial = common::serial();
    let config = RunnerConfig {
        excluded: "parser".into(),
        json: true,
        ..plain_config()
    };

    let (passed, text) = render(&config);
    assert!(passed);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["summary"]["ran"], 1);
    assert_eq!(value["summary"]["failed"], 0);
    assert_eq!(value["entries"][0]["kind"], "header");
    assert_eq!(value["entries"][0]["text"], "Storage [io, slow]");
}
