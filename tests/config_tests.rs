// Config loading and validation tests

use panload::config::AppConfig;

const VALID_CONFIG: &str = r#"
[device]
host = "fw01.example.net"
api_key = "LUFRPT1abc"
panorama = false
timeout_secs = 20

[schedule]
loop = true
interval_secs = 86400
"#;

const USER_PASSWORD_CONFIG: &str = r#"
[device]
host = "10.0.0.1"
username = "admin"
password = "secret"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.device.host, "fw01.example.net");
    assert_eq!(config.device.api_key.as_deref(), Some("LUFRPT1abc"));
    assert_eq!(config.device.timeout_secs, 20);
    assert!(!config.device.panorama);
    assert!(config.schedule.run_loop);
    assert_eq!(config.schedule.interval_secs, 86400);
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str(USER_PASSWORD_CONFIG).expect("valid");
    assert_eq!(config.device.scheme, "https");
    assert!(config.device.verify_tls);
    assert_eq!(config.device.timeout_secs, 30);
    assert_eq!(config.device.report_poll_attempts, 30);
    assert_eq!(config.device.report_poll_interval_ms, 2000);
    assert!(config.output.dir.is_empty());
    assert!(!config.schedule.run_loop);
    assert_eq!(config.schedule.interval_secs, 24 * 3600);
    assert!(config.schedule.cron.is_none());
}

#[test]
fn test_config_validation_rejects_empty_host() {
    let bad = VALID_CONFIG.replace("host = \"fw01.example.net\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("device.host"));
}

#[test]
fn test_config_validation_rejects_unknown_scheme() {
    let bad = USER_PASSWORD_CONFIG.replace("host = \"10.0.0.1\"", "host = \"10.0.0.1\"\nscheme = \"ftp\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("device.scheme"));
}

#[test]
fn test_config_validation_requires_credentials() {
    let bad = VALID_CONFIG.replace("api_key = \"LUFRPT1abc\"", "");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("device.api_key"));
}

#[test]
fn test_config_validation_requires_password_with_username() {
    let bad = USER_PASSWORD_CONFIG.replace("password = \"secret\"", "");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("device.password"));
}

#[test]
fn test_config_validation_rejects_timeout_zero() {
    let bad = VALID_CONFIG.replace("timeout_secs = 20", "timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = VALID_CONFIG.replace("interval_secs = 86400", "interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("schedule.interval_secs"));
}

#[test]
fn test_config_validation_rejects_invalid_cron() {
    let bad = format!("{VALID_CONFIG}cron = \"not a cron\"\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("schedule.cron"));
}

#[test]
fn test_config_accepts_valid_cron() {
    let ok = format!("{VALID_CONFIG}cron = \"0 0 6 * * *\"\n");
    let config = AppConfig::load_from_str(&ok).expect("valid cron");
    assert_eq!(config.schedule.cron.as_deref(), Some("0 0 6 * * *"));
}

#[test]
fn test_config_validation_rejects_missing_output_dir() {
    let bad = format!("{USER_PASSWORD_CONFIG}\n[output]\ndir = \"/nonexistent/panload-out\"\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("output.dir"));
}

#[test]
fn test_config_validation_rejects_output_dir_that_is_a_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let bad = format!(
        "{USER_PASSWORD_CONFIG}\n[output]\ndir = {:?}\n",
        file.path().to_str().unwrap()
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let with_output = format!(
        "{VALID_CONFIG}\n[output]\ndir = {:?}\n",
        dir.path().to_str().unwrap()
    );
    std::fs::write(&path, with_output).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.device.host, "fw01.example.net");
    assert_eq!(config.output.dir, dir.path().to_str().unwrap());
}
