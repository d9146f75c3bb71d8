use serial_test::serial;
use spotlight_config::{SpotlightConfig, SpotlightConfigLoader};
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write_file(tmp: &TempDir, name: &str, body: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, body).expect("write config");
    p
}

#[test]
#[serial]
fn json_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    let p = write_file(
        &tmp,
        "spotlight.json",
        r#"{"request_timeout": 30, "max_retries": 5, "concurrency": 3}"#,
    );

    let config = SpotlightConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load config");

    assert_eq!(config.request_timeout, 30);
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.concurrency, 3);
    assert_eq!(config.base_url, SpotlightConfig::default().base_url);
}

#[test]
#[serial]
fn environment_wins_over_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_file(
        &tmp,
        "spotlight.yaml",
        "max_retries: 1\nuser_agent: \"${SPOTLIGHT_TEST_UA}\"\n",
    );

    let config = temp_env::with_vars(
        [
            ("SPOTLIGHT__MAX_RETRIES", Some("4")),
            ("SPOTLIGHT_TEST_UA", Some("spotlight-test/1.0")),
        ],
        || SpotlightConfigLoader::new().with_file(&p).load(),
    )
    .expect("load config");

    assert_eq!(config.max_retries, 4);
    assert_eq!(config.user_agent, "spotlight-test/1.0");
}

#[test]
#[serial]
fn missing_optional_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = SpotlightConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.json"))
        .load()
        .expect("defaults");
    assert_eq!(config, SpotlightConfig::default());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(
        SpotlightConfigLoader::new()
            .with_file(tmp.path().join("absent.json"))
            .load()
            .is_err()
    );
}

#[test]
#[serial]
fn malformed_value_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let p = write_file(&tmp, "spotlight.json", r#"{"concurrency": "many"}"#);
    assert!(SpotlightConfigLoader::new().with_file(p).load().is_err());
}
