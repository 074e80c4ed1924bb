use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GatorError, GatorResult};
use crate::sources::rss_feed::DEFAULT_TIMEOUT;

const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

/// What is persisted on disk. Environment overrides never get written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub current_user_name: Option<String>,
    pub fetch_timeout: Duration,
    path: PathBuf,
    file: ConfigFile,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Load `.env` from the executable's directory, then the current directory.
    pub fn load_env_files() {
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        dotenvy::dotenv().ok();
    }

    /// `~/.gatorconfig.json`, falling back to the executable's directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(Self::exe_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    fn default_db_path() -> String {
        Self::exe_dir()
            .map(|d| d.join("gator.db").to_string_lossy().into_owned())
            .unwrap_or_else(|| "./gator.db".to_string())
    }

    /// Read the config file (a missing file means defaults) and apply
    /// `GATOR_DB_PATH` and `GATOR_FETCH_TIMEOUT_SECS` on top.
    pub fn load(path: Option<PathBuf>) -> GatorResult<Self> {
        let mut config = Self::from_file(path.unwrap_or_else(Self::default_path))?;

        if let Ok(db_path) = std::env::var("GATOR_DB_PATH") {
            config.db_path = db_path;
        }

        if let Ok(secs) = std::env::var("GATOR_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                GatorError::Config(format!("GATOR_FETCH_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn from_file<P: Into<PathBuf>>(path: P) -> GatorResult<Self> {
        let path = path.into();
        let file = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            ConfigFile::default()
        };

        Ok(Self {
            db_path: file.db_path.clone().unwrap_or_else(Self::default_db_path),
            current_user_name: file.current_user_name.clone(),
            fetch_timeout: DEFAULT_TIMEOUT,
            path,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make `name` the current user and persist it.
    pub fn set_user(&mut self, name: &str) -> GatorResult<()> {
        self.file.current_user_name = Some(name.to_string());
        self.current_user_name = Some(name.to_string());
        self.write()
    }

    fn write(&self) -> GatorResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(dir.path().join("missing.json")).unwrap();

        assert!(config.current_user_name.is_none());
        assert!(config.db_path.ends_with("gator.db"));
        assert_eq!(config.fetch_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"db_path": "/tmp/feeds.db", "current_user_name": "alice"}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.db_path, "/tmp/feeds.db");
        assert_eq!(config.current_user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn test_set_user_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::from_file(&path).unwrap();
        config.set_user("bob").unwrap();
        assert_eq!(config.current_user_name.as_deref(), Some("bob"));

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.current_user_name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_set_user_keeps_db_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"db_path": "/tmp/feeds.db"}"#).unwrap();

        let mut config = Config::from_file(&path).unwrap();
        config.set_user("carol").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("/tmp/feeds.db"));
        assert!(written.contains("carol"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::from_file(&path), Err(GatorError::Json(_))));
    }
}
