use configuration::{ConfigError, Settings, load_settings_from};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let file = write_config(
        r#"
[indicators]
rsi_window = 21
ma_windows = [10, 50, 200]

[statistics]
risk_free_rate = 0.04
"#,
    );

    let settings = load_settings_from(file.path()).unwrap();
    assert_eq!(settings.indicators.rsi_window, 21);
    assert_eq!(settings.indicators.ma_windows, vec![10, 50, 200]);
    assert_eq!(settings.statistics.risk_free_rate, 0.04);
    // Untouched sections keep their defaults.
    assert_eq!(settings.indicators.bb_window, 20);
    assert_eq!(settings.forecast, Settings::default().forecast);
    assert_eq!(settings.market_data, Settings::default().market_data);
}

#[test]
fn invalid_values_are_rejected_after_loading() {
    let file = write_config(
        r#"
[indicators]
macd_fast = 30
macd_slow = 26
"#,
    );

    let err = load_settings_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn missing_explicit_file_is_a_load_error() {
    let err = load_settings_from("/definitely/not/here/cryptolens.toml").unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}

#[test]
fn logging_directory_is_optional() {
    let file = write_config(
        r#"
[logging]
level = "debug"
directory = "logs"
"#,
    );

    let settings = load_settings_from(file.path()).unwrap();
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(
        settings.logging.directory.as_deref(),
        Some(std::path::Path::new("logs"))
    );
}
