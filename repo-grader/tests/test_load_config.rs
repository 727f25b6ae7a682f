use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

use repo_grader::load_config::{
    default_config, load_config, GEMINI_API_KEY_VAR, GITHUB_TOKEN_VAR,
};

/// A full static config file is parsed and secrets come from the environment.
#[test]
#[serial]
fn test_load_config_success_with_env_secrets() {
    let config_yaml = r#"
server:
  host: 127.0.0.1
  port: 8080
github:
  api_base_url: "https://github.example.com/api/v3"
gemini:
  api_base_url: "http://localhost:9999/v1beta"
  default_model: gemini-2.0-flash
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(GITHUB_TOKEN_VAR, "gh-test-token");
    env::set_var(GEMINI_API_KEY_VAR, "gemini-test-key");

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.github.api_base_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.token.as_deref(), Some("gh-test-token"));
    assert_eq!(config.gemini.api_base_url, "http://localhost:9999/v1beta");
    assert_eq!(config.gemini.default_model, "gemini-2.0-flash");
    assert_eq!(config.gemini.api_key.as_deref(), Some("gemini-test-key"));

    env::remove_var(GITHUB_TOKEN_VAR);
    env::remove_var(GEMINI_API_KEY_VAR);
}

/// Sections left out of the file fall back to defaults.
#[test]
#[serial]
fn test_load_config_partial_file_uses_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "server:\n  port: 6000\n").unwrap();

    env::remove_var(GITHUB_TOKEN_VAR);
    env::remove_var(GEMINI_API_KEY_VAR);

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.github.api_base_url, "https://api.github.com");
    assert_eq!(config.gemini.default_model, "gemini-1.5-flash");
    assert!(config.github.token.is_none());
    assert!(config.gemini.api_key.is_none());
}

/// Secrets in the file are ignored; only the environment provides them.
#[test]
#[serial]
fn test_load_config_ignores_secrets_in_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(
        config_file.path(),
        "github:\n  token: leaked\ngemini:\n  api_key: leaked\n",
    )
    .unwrap();

    env::remove_var(GITHUB_TOKEN_VAR);
    env::remove_var(GEMINI_API_KEY_VAR);

    let config = load_config(config_file.path()).expect("Config should load");
    assert!(config.github.token.is_none());
    assert!(config.gemini.api_key.is_none());
}

#[test]
#[serial]
fn test_empty_file_and_blank_secrets() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "").unwrap();
    env::set_var(GITHUB_TOKEN_VAR, "   ");

    let config = load_config(config_file.path()).expect("Empty config should load");
    assert_eq!(config.server.port, 5000);
    assert!(config.github.token.is_none());

    env::remove_var(GITHUB_TOKEN_VAR);
}

#[test]
#[serial]
fn test_default_config_reads_env() {
    env::set_var(GEMINI_API_KEY_VAR, "from-env");
    let config = default_config();
    assert_eq!(config.gemini.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.server.port, 5000);
    env::remove_var(GEMINI_API_KEY_VAR);
}

#[test]
fn test_load_config_missing_file_fails() {
    let err = load_config("definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_config_invalid_yaml_fails() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "server: [unclosed").unwrap();
    let err = load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));
}
