//! Integration tests for configuration layering

use gapfill::config::{ConfigLoader, LoadOptions};
use gapfill::error::EngineError;
use gapfill::logging::LogFormat;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn options(env: &[(&str, &str)]) -> LoadOptions {
    LoadOptions {
        env: Some(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        ),
        skip_global: true,
        ..LoadOptions::default()
    }
}

fn write_workspace_config(root: &Path, name: &str, content: &str) {
    let dir = root.join("config");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_defaults_without_any_source() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_with(temp_dir.path(), &options(&[])).unwrap();

    assert_eq!(config.scheduler.max_per_run, 20);
    assert_eq!(config.scheduler.item_delay_ms, 3000);
    assert_eq!(config.scheduler.round_interval_ms, 3_600_000);
    assert_eq!(config.provider.model, "qwen-max");
    assert_eq!(config.provider.provider_name, "qwen");
    assert!(config.provider.api_key.is_none());
    assert_eq!(config.storage.path, Path::new(".gapfill/store"));
}

#[test]
fn test_precedence_workspace_legacy_prefixed() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(
        temp_dir.path(),
        "config.toml",
        r#"
[provider]
model = "qwen-plus"

[scheduler]
max_per_run = 5
item_delay_ms = 100
"#,
    );

    let config = ConfigLoader::load_with(temp_dir.path(), &options(&[])).unwrap();
    assert_eq!(config.scheduler.max_per_run, 5);
    assert_eq!(config.provider.model, "qwen-plus");

    let config = ConfigLoader::load_with(
        temp_dir.path(),
        &options(&[("AUTOEXPAND_MAX_PER_RUN", "7"), ("QWEN_API_KEY", "sk-legacy")]),
    )
    .unwrap();
    assert_eq!(config.scheduler.max_per_run, 7);
    assert_eq!(config.scheduler.item_delay_ms, 100);
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-legacy"));

    let config = ConfigLoader::load_with(
        temp_dir.path(),
        &options(&[
            ("AUTOEXPAND_MAX_PER_RUN", "7"),
            ("GAPFILL__SCHEDULER__MAX_PER_RUN", "9"),
            ("GAPFILL__PROVIDER__API_KEY", "sk-prefixed"),
            ("QWEN_API_KEY", "sk-legacy"),
        ]),
    )
    .unwrap();
    assert_eq!(config.scheduler.max_per_run, 9);
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-prefixed"));
}

#[test]
fn test_environment_specific_file_overrides_base() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(temp_dir.path(), "config.toml", "[scheduler]\nmax_per_run = 5\n");
    write_workspace_config(temp_dir.path(), "production.toml", "[scheduler]\nmax_per_run = 50\n");

    let development = ConfigLoader::load_with(temp_dir.path(), &options(&[])).unwrap();
    assert_eq!(development.scheduler.max_per_run, 5);

    let production =
        ConfigLoader::load_with(temp_dir.path(), &options(&[("GAPFILL_ENV", "production")]))
            .unwrap();
    assert_eq!(production.scheduler.max_per_run, 50);
}

#[test]
fn test_explicit_file_layers_over_workspace() {
    let temp_dir = TempDir::new().unwrap();
    write_workspace_config(temp_dir.path(), "config.toml", "[scheduler]\nmax_per_run = 5\n");
    let explicit = temp_dir.path().join("ops.toml");
    std::fs::write(
        &explicit,
        r#"
[scheduler]
round_interval_ms = 60000

[storage]
path = "/var/lib/gapfill"

[logging]
format = "json"
"#,
    )
    .unwrap();

    let mut opts = options(&[]);
    opts.config_file = Some(explicit);
    let config = ConfigLoader::load_with(temp_dir.path(), &opts).unwrap();
    assert_eq!(config.scheduler.max_per_run, 5);
    assert_eq!(config.scheduler.round_interval_ms, 60_000);
    assert_eq!(config.storage.path, Path::new("/var/lib/gapfill"));
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut opts = options(&[]);
    opts.config_file = Some(temp_dir.path().join("absent.toml"));

    let err = ConfigLoader::load_with(temp_dir.path(), &opts).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_non_numeric_legacy_knob_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_with(
        temp_dir.path(),
        &options(&[("AUTOEXPAND_INTERVAL_MS", "soon")]),
    )
    .unwrap_err();
    assert_eq!(err.class(), "config");
}

#[test]
fn test_zero_batch_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_with(
        temp_dir.path(),
        &options(&[("GAPFILL__SCHEDULER__MAX_PER_RUN", "0")]),
    )
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("standalone.toml");
    std::fs::write(&file, "[provider]\nendpoint = \"http://localhost:8080/generate\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    assert_eq!(config.provider.endpoint, "http://localhost:8080/generate");
    assert_eq!(config.scheduler.max_per_run, 20);
    assert!(config.validate().is_ok());
}
