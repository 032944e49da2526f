use dtree_cli::{AppConfig, ConfigError, LogFormat};
use dtree_core::{DuplicatePolicy, ValuationPolicy};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn file_settings_are_loaded() {
    let file = write_config(
        r#"
        [log]
        level = "dtree_core=debug,info"
        format = "json"

        [service]
        default_page_size = 20
        max_page_size = 50

        [service.tree]
        duplicate_policy = "last_wins"
        valuation_policy = "abort"
        "#,
    );

    let config = AppConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.log.level, "dtree_core=debug,info");
    assert_eq!(config.log.format, LogFormat::Json);
    assert_eq!(config.service.default_page_size, 20);
    assert_eq!(config.service.max_page_size, 50);
    assert_eq!(config.service.max_title_len, 200);
    assert_eq!(config.service.tree.duplicate_policy, DuplicatePolicy::LastWins);
    assert_eq!(config.service.tree.valuation_policy, ValuationPolicy::Abort);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = AppConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = write_config("[service\nmax_page_size = ");
    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn unknown_policy_is_rejected() {
    let file = write_config(
        r#"
        [service.tree]
        valuation_policy = "ignore"
        "#,
    );
    assert!(matches!(
        AppConfig::from_file(file.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn inconsistent_page_sizes_fail_validation() {
    let file = write_config(
        r#"
        [service]
        default_page_size = 80
        max_page_size = 40
        "#,
    );
    let config = AppConfig::from_file(file.path()).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}
