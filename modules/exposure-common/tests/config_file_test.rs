//! Config loading from disk.

use std::path::PathBuf;

use exposure_common::config::load_config;
use exposure_common::Config;

#[test]
fn load_config_reads_toml_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exposure.toml");
    std::fs::write(
        &path,
        r#"
        [paths]
        data_dir = "panel"
        activity_log = "threads_posts.csv"

        [weeks]
        epoch = "2022-10-27T00:00:00Z"
        "#,
    )
    .unwrap();

    let mut config = load_config(&path).unwrap();
    config.resolve_paths();

    assert_eq!(config.paths.activity_log, PathBuf::from("panel/threads_posts.csv"));
    assert_eq!(config.week_clock().epoch().to_rfc3339(), "2022-10-27T00:00:00+00:00");
}

#[test]
fn load_config_names_the_file_on_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[paths\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.filter.topics.len(), 2);
}
