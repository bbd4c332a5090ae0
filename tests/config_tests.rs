use std::io::Write;
use std::path::PathBuf;

use buttonpipe::{
    AppConfig, AppError, Cli, DEFAULT_BOUNCE_MS, DEFAULT_PIPE_PATH, EdgeMode, MAX_PINS,
    MAX_WINDOW_MS, Output, RunMode,
};
use clap::Parser;

fn parse(args: &[&str]) -> Result<(AppConfig, RunMode, Output), AppError> {
    let mut argv = vec!["buttonpipe"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid arguments").into_config()
}

#[test]
fn defaults_match_documented_values() {
    let (config, mode, output) = parse(&["17", "27"]).expect("config");

    assert_eq!(config.pins, vec![17, 27]);
    assert_eq!(config.bounce_ms, DEFAULT_BOUNCE_MS);
    assert_eq!(config.edge, EdgeMode::Both);
    assert!(!config.no_export);
    assert_eq!(config.settle_ms, 2);
    assert_eq!(config.poll_timeout_ms, 3000);
    assert_eq!(config.startup_grace_ms, 1000);
    assert_eq!(mode, RunMode::Monitor);
    assert_eq!(output, Output::Pipe(PathBuf::from(DEFAULT_PIPE_PATH)));
}

#[test]
fn short_flags_follow_the_classic_interface() {
    let (config, _, output) = parse(&["-r", "-b", "50", "-n", "-d", "4"]).expect("config");

    assert_eq!(config.edge, EdgeMode::Rising);
    assert_eq!(config.bounce_ms, 50);
    assert!(config.no_export);
    assert_eq!(output, Output::Console);

    let (config, _, _) = parse(&["-f", "4"]).expect("config");
    assert_eq!(config.edge, EdgeMode::Falling);
}

#[test]
fn one_shot_modes_are_selected() {
    let (_, mode, _) = parse(&["-e", "4"]).expect("config");
    assert_eq!(mode, RunMode::ExportOnly);

    let (_, mode, _) = parse(&["-u", "4"]).expect("config");
    assert_eq!(mode, RunMode::UnexportOnly);
}

#[test]
fn pipe_path_can_be_overridden() {
    let (_, _, output) = parse(&["-o", "/run/buttons", "4"]).expect("config");
    assert_eq!(output, Output::Pipe(PathBuf::from("/run/buttons")));
}

#[test]
fn rising_and_falling_conflict() {
    assert!(Cli::try_parse_from(["buttonpipe", "-r", "-f", "4"]).is_err());
}

#[test]
fn unparseable_pin_is_rejected() {
    assert!(Cli::try_parse_from(["buttonpipe", "seventeen"]).is_err());
    assert!(Cli::try_parse_from(["buttonpipe", "-b", "soon", "4"]).is_err());
}

#[test]
fn missing_pins_is_a_configuration_error() {
    let err = parse(&[]).expect_err("no pins");
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.is_usage());
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn too_many_pins_is_a_configuration_error() {
    let pins: Vec<String> = (0..=MAX_PINS as u32).map(|p| p.to_string()).collect();
    let mut args: Vec<&str> = pins.iter().map(String::as_str).collect();
    let err = parse(&args).expect_err("too many pins");
    assert!(err.to_string().contains("too many pins"));

    args.pop();
    let (config, _, _) = parse(&args).expect("maximum is allowed");
    assert_eq!(config.pins.len(), MAX_PINS);
}

#[test]
fn duplicate_pins_are_accepted() {
    let (config, _, _) = parse(&["4", "4"]).expect("config");
    assert_eq!(config.pins, vec![4, 4]);
}

#[test]
fn config_file_supplies_values_and_cli_overrides() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{
            "pins": [5, 6],
            "bounce_ms": 120,
            "edge": "falling",
            "pipe_path": "/tmp/from-file",
            "no_export": true
        }}"#
    )
    .expect("write config");
    let path = file.path().to_str().expect("utf8 path");

    let (config, _, output) = parse(&["-c", path]).expect("config");
    assert_eq!(config.pins, vec![5, 6]);
    assert_eq!(config.bounce_ms, 120);
    assert_eq!(config.edge, EdgeMode::Falling);
    assert!(config.no_export);
    assert_eq!(output, Output::Pipe(PathBuf::from("/tmp/from-file")));
    assert_eq!(config.settle_ms, 2);

    let (config, _, _) = parse(&["-c", path, "-b", "40", "-r", "9"]).expect("config");
    assert_eq!(config.pins, vec![9]);
    assert_eq!(config.bounce_ms, 40);
    assert_eq!(config.edge, EdgeMode::Rising);
}

#[test]
fn invalid_config_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{{ \"pins\": \"not a list\" }}").expect("write config");

    let err = AppConfig::load_from_file(file.path()).expect_err("invalid json");
    assert!(err.to_string().contains("Invalid config json"));

    let err = AppConfig::load_from_file("/nonexistent/buttonpipe.json").expect_err("missing");
    assert!(err.to_string().contains("Failed to read config"));
}

fn config_from(json: &str) -> AppConfig {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "{json}").expect("write config");
    AppConfig::load_from_file(file.path()).expect("config parses")
}

#[test]
fn bounce_beyond_signed_millis_is_rejected() {
    let too_long = (MAX_WINDOW_MS + 1).to_string();
    assert!(Cli::try_parse_from(["buttonpipe", "-b", &too_long, "17"]).is_err());
    assert!(Cli::try_parse_from(["buttonpipe", "-b", "18446744073709551615", "17"]).is_err());

    let max = MAX_WINDOW_MS.to_string();
    let (config, _, _) = parse(&["-b", &max, "17"]).expect("largest window is allowed");
    assert_eq!(config.bounce_ms, MAX_WINDOW_MS);

    let config = config_from(r#"{ "pins": [17], "bounce_ms": 18446744073709551615 }"#);
    let err = config.validate().expect_err("bounce out of range");
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("bounce time"));
}

#[test]
fn startup_grace_beyond_signed_millis_is_rejected() {
    let config = config_from(r#"{ "pins": [17], "startup_grace_ms": 9223372036854775808 }"#);
    let err = config.validate().expect_err("grace out of range");
    assert!(err.to_string().contains("startup grace"));
}

#[test]
fn clock_jump_threshold_must_be_positive_and_representable() {
    let config = config_from(r#"{ "pins": [17], "clock_jump_secs": 18446744073709551615 }"#);
    let err = config.validate().expect_err("threshold too large");
    assert!(err.is_usage());
    assert!(err.to_string().contains("clock jump threshold"));

    let config = config_from(r#"{ "pins": [17], "clock_jump_secs": 0 }"#);
    let err = config.validate().expect_err("zero threshold");
    assert!(err.to_string().contains("clock jump threshold"));

    let config = config_from(r#"{ "pins": [17], "clock_jump_secs": 60 }"#);
    config.validate().expect("one minute threshold");
}

#[test]
fn poll_timeout_must_fit_a_poll_call() {
    let config = config_from(r#"{ "pins": [17], "poll_timeout_ms": 0 }"#);
    let err = config.validate().expect_err("zero timeout");
    assert!(err.to_string().contains("poll timeout"));

    let config = config_from(r#"{ "pins": [17], "poll_timeout_ms": 2147483648 }"#);
    let err = config.validate().expect_err("timeout beyond c_int");
    assert_eq!(err.exit_code(), 2);

    let config = config_from(r#"{ "pins": [17], "poll_timeout_ms": 2147483647 }"#);
    config.validate().expect("largest timeout");
}
