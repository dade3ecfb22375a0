use super::*;

use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn defaults_point_at_local_service() {
    let settings = RawSettings::default().finish().expect("defaults");
    assert_eq!(settings.api_base_url.as_str(), "http://localhost:8000/");
    assert_eq!(settings.status_expiry, Duration::from_secs(5));
    assert!(settings.disable_input_while_pending);
    assert_eq!(settings.request_timeout, None);
}

#[test]
fn base_url_gains_trailing_slash_so_endpoints_nest() {
    let url = parse_base_url("https://analyst.example.com/v1").expect("parse");
    assert_eq!(url.as_str(), "https://analyst.example.com/v1/");
    assert_eq!(
        url.join("api/query").expect("join").as_str(),
        "https://analyst.example.com/v1/api/query"
    );
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(matches!(
        parse_base_url("ftp://example.com"),
        Err(SettingsError::UnsupportedScheme(_))
    ));
    assert!(matches!(
        parse_base_url("not a url"),
        Err(SettingsError::InvalidUrl { .. })
    ));
}

#[test]
fn file_layer_overrides_defaults() {
    let mut raw = RawSettings::default();
    raw.apply_file(
        "analyst.toml",
        r#"
api_url = "http://10.0.0.5:9000"
status_expiry_ms = 2500
disable_input_while_pending = false
"#,
    )
    .expect("apply file");
    let settings = raw.finish().expect("finish");
    assert_eq!(settings.api_base_url.as_str(), "http://10.0.0.5:9000/");
    assert_eq!(settings.status_expiry, Duration::from_millis(2500));
    assert!(!settings.disable_input_while_pending);
}

#[test]
fn malformed_file_is_reported_with_its_path() {
    let mut raw = RawSettings::default();
    let err = raw
        .apply_file("custom.toml", "status_expiry_ms = \"soon\"")
        .expect_err("must fail");
    assert!(err.to_string().contains("custom.toml"), "{err}");
}

#[test]
fn env_layer_wins_over_file_and_prefixed_name_wins_last() {
    let mut raw = RawSettings::default();
    raw.apply_file("analyst.toml", r#"api_url = "http://from-file:1""#)
        .expect("apply file");
    raw.apply_env(env_of(&[
        ("ANALYST_API_URL", "http://from-env:2"),
        ("APP__API_URL", "http://from-app-env:3"),
        ("APP__STATUS_EXPIRY_MS", "750"),
        ("APP__DISABLE_INPUT_WHILE_PENDING", "no"),
        ("APP__REQUEST_TIMEOUT_MS", "30000"),
    ]));
    let settings = raw.finish().expect("finish");
    assert_eq!(settings.api_base_url.as_str(), "http://from-app-env:3/");
    assert_eq!(settings.status_expiry, Duration::from_millis(750));
    assert!(!settings.disable_input_while_pending);
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn invalid_env_values_keep_previous_layer() {
    let mut raw = RawSettings::default();
    raw.apply_env(env_of(&[
        ("APP__STATUS_EXPIRY_MS", "five"),
        ("APP__DISABLE_INPUT_WHILE_PENDING", "maybe"),
    ]));
    let settings = raw.finish().expect("finish");
    assert_eq!(settings.status_expiry, Duration::from_secs(5));
    assert!(settings.disable_input_while_pending);
}

#[test]
fn load_settings_reads_explicit_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("analyst_settings_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("custom.toml");
    fs::write(&path, "status_expiry_ms = 1234\n").expect("write settings");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.status_expiry, Duration::from_millis(1234));

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn load_settings_fails_for_missing_explicit_file() {
    let err = load_settings(Some(Path::new("/definitely/not/here/analyst.toml")))
        .expect_err("must fail");
    assert!(matches!(err, SettingsError::Read { .. }));
}
