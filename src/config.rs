use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DB_FILE: &str = "fintrack.db";
const LOG_FILE: &str = "fintrack.log";

pub(crate) const ENV_DB: &str = "FINTRACK_DB";
pub(crate) const ENV_EXPORT_DIR: &str = "FINTRACK_EXPORT_DIR";
pub(crate) const ENV_LOG_FILE: &str = "FINTRACK_LOG_FILE";

/// Where the store, the log and exported files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) log_file: PathBuf,
}

impl Config {
    /// Resolve paths from the environment and the platform directories.
    /// `db_override` (the `--db` flag) wins over everything.
    pub(crate) fn load(db_override: Option<PathBuf>) -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "fintrack");
        let user_dirs = directories::UserDirs::new();
        let config = Self::resolve(
            |key| std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from),
            proj_dirs.as_ref().map(|d| d.data_dir()),
            user_dirs.as_ref().map(|d| d.home_dir()),
            db_override,
        )?;
        config.ensure_dirs()?;
        Ok(config)
    }

    fn resolve(
        env: impl Fn(&str) -> Option<PathBuf>,
        data_dir: Option<&Path>,
        home_dir: Option<&Path>,
        db_override: Option<PathBuf>,
    ) -> Result<Self> {
        let data_file = |name: &str| -> Result<PathBuf> {
            data_dir
                .map(|dir| dir.join(name))
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        };

        let db_path = match db_override.or_else(|| env(ENV_DB)) {
            Some(path) => path,
            None => data_file(DB_FILE)?,
        };
        let log_file = match env(ENV_LOG_FILE) {
            Some(path) => path,
            None => data_file(LOG_FILE)?,
        };
        let export_dir = env(ENV_EXPORT_DIR)
            .or_else(|| home_dir.map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            db_path,
            export_dir,
            log_file,
        })
    }

    fn ensure_dirs(&self) -> Result<()> {
        for file in [&self.db_path, &self.log_file] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
