//! Tests for the settings precedence stack: defaults → file → environment

use formstate_config::FormsConfig;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

const ENV_KEY: &str = "FORMSTATE_USE_MARKDOWN_IN_VALIDATORS";

#[test_log::test]
#[serial]
fn test_defaults_without_sources() {
    env::remove_var(ENV_KEY);
    let dir = TempDir::new().unwrap();

    let config = FormsConfig::load_in(dir.path()).unwrap();
    assert_eq!(config, FormsConfig::default());
}

#[test_log::test]
#[serial]
fn test_file_overrides_defaults() {
    env::remove_var(ENV_KEY);
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("formstate.toml"),
        "use_markdown_in_validators = false\n",
    )
    .unwrap();

    let config = FormsConfig::load_in(dir.path()).unwrap();
    assert!(!config.use_markdown_in_validators);
}

#[test_log::test]
#[serial]
fn test_yaml_file_is_discovered() {
    env::remove_var(ENV_KEY);
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("formstate.yaml"),
        "use_markdown_in_validators: false\n",
    )
    .unwrap();

    let config = FormsConfig::load_in(dir.path()).unwrap();
    assert!(!config.use_markdown_in_validators);
}

#[test_log::test]
#[serial]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("formstate.toml"),
        "use_markdown_in_validators = false\n",
    )
    .unwrap();
    env::set_var(ENV_KEY, "true");

    let config = FormsConfig::load_in(dir.path());
    env::remove_var(ENV_KEY);

    assert!(config.unwrap().use_markdown_in_validators);
}
