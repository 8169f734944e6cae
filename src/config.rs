//! Configuration for the cached data layer.

use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::cache::{StalenessPolicy, DEFAULT_TTL_MINUTES};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    source: serde_yaml::Error,
  },

  #[error("could not determine a data directory for the cache database")]
  NoDataDir,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Override for the cache database location.
  pub db_path: Option<PathBuf>,
  /// How long a cached record stays trusted while online, in minutes.
  #[serde(default = "default_ttl_minutes")]
  pub ttl_minutes: i64,
}

fn default_ttl_minutes() -> i64 {
  DEFAULT_TTL_MINUTES
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      db_path: None,
      ttl_minutes: DEFAULT_TTL_MINUTES,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./pawfeed.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/pawfeed/config.yaml
  ///
  /// No file anywhere is not an error; the cache layer runs fine on
  /// defaults.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => {
        debug!("no config file found, using defaults");
        Ok(Self::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("pawfeed.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("pawfeed").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Where the cache database lives: the configured override, or
  /// `<data dir>/pawfeed/cache.db`.
  pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
    if let Some(path) = &self.cache.db_path {
      return Ok(path.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(ConfigError::NoDataDir)?;

    Ok(data_dir.join("pawfeed").join("cache.db"))
  }

  /// The staleness policy this configuration describes.
  pub fn policy(&self) -> StalenessPolicy {
    StalenessPolicy::new(Duration::minutes(self.cache.ttl_minutes))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_when_no_file() {
    let config = Config::default();
    assert_eq!(config.cache.ttl_minutes, DEFAULT_TTL_MINUTES);
    assert!(config.cache.db_path.is_none());
  }

  #[test]
  fn test_parse_full_config() {
    let yaml = "cache:\n  db_path: /tmp/pawfeed-test/cache.db\n  ttl_minutes: 3\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.cache.ttl_minutes, 3);
    assert_eq!(
      config.db_path().unwrap(),
      PathBuf::from("/tmp/pawfeed-test/cache.db")
    );
    assert_eq!(config.policy().ttl(), Duration::minutes(3));
  }

  #[test]
  fn test_ttl_defaults_when_omitted() {
    let yaml = "cache:\n  db_path: /tmp/pawfeed-test/cache.db\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.cache.ttl_minutes, DEFAULT_TTL_MINUTES);
  }

  #[test]
  fn test_explicit_missing_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/pawfeed.yaml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
  }
}
