#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<PathBuf> {
    let map: HashMap<String, PathBuf> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), PathBuf::from(v)))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_use_platform_dirs() {
    let config = Config::resolve(
        env_of(&[]),
        Some(Path::new("/data/fintrack")),
        Some(Path::new("/home/me")),
        None,
    )
    .unwrap();
    assert_eq!(config.db_path, PathBuf::from("/data/fintrack/fintrack.db"));
    assert_eq!(config.log_file, PathBuf::from("/data/fintrack/fintrack.log"));
    assert_eq!(config.export_dir, PathBuf::from("/home/me"));
}

#[test]
fn test_env_overrides_defaults() {
    let config = Config::resolve(
        env_of(&[
            (ENV_DB, "/tmp/a.db"),
            (ENV_EXPORT_DIR, "/tmp/out"),
            (ENV_LOG_FILE, "/tmp/f.log"),
        ]),
        Some(Path::new("/data/fintrack")),
        Some(Path::new("/home/me")),
        None,
    )
    .unwrap();
    assert_eq!(config.db_path, PathBuf::from("/tmp/a.db"));
    assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
    assert_eq!(config.log_file, PathBuf::from("/tmp/f.log"));
}

#[test]
fn test_db_flag_wins_over_env() {
    let config = Config::resolve(
        env_of(&[(ENV_DB, "/tmp/a.db")]),
        Some(Path::new("/data/fintrack")),
        None,
        Some(PathBuf::from("/tmp/flag.db")),
    )
    .unwrap();
    assert_eq!(config.db_path, PathBuf::from("/tmp/flag.db"));
    assert_eq!(config.export_dir, PathBuf::from("."));
}

#[test]
fn test_missing_data_dir_without_overrides_fails() {
    assert!(Config::resolve(env_of(&[]), None, None, None).is_err());
    let config = Config::resolve(
        env_of(&[(ENV_DB, "a.db"), (ENV_LOG_FILE, "a.log")]),
        None,
        None,
        None,
    )
    .unwrap();
    assert_eq!(config.db_path, PathBuf::from("a.db"));
}

#[test]
fn test_ensure_dirs_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        db_path: dir.path().join("nested/deeper/fintrack.db"),
        export_dir: dir.path().to_path_buf(),
        log_file: dir.path().join("logs/fintrack.log"),
    };
    config.ensure_dirs().unwrap();
    assert!(dir.path().join("nested/deeper").is_dir());
    assert!(dir.path().join("logs").is_dir());
}
