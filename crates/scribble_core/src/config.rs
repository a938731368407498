//! Scribble configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (`SCRIBBLE_DATABASE`, `SCRIBBLE_BASE_URL`)
//! 2. YAML config file (`scribble.yaml`)
//! 3. Defaults
//!
//! Relative connection paths in a config file resolve against the file's
//! parent directory.

use crate::db::{open_db, DbError};
use crate::model::term::MainCategoryRule;
use crate::repo::query::NavigationKey;
use crate::shares::{ShareThisClient, DEFAULT_SHARE_CACHE_TTL};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DATABASE_ENV: &str = "SCRIBBLE_DATABASE";
pub const BASE_URL_ENV: &str = "SCRIBBLE_BASE_URL";
pub const DEFAULT_CONNECTION: &str = "wordpress";
pub const DEFAULT_POST_ROUTE: &str = "/blog/{slug}";
pub const CONFIG_FILE_NAME: &str = "scribble.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("connection `{0}` is not configured")]
    UnknownConnection(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Settings shared by every entity of one `Scribble` context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribbleConfig {
    /// Name of the connection entities bind to.
    pub connection: String,
    /// Connection name to SQLite database path.
    pub connections: BTreeMap<String, PathBuf>,
    /// Base URL that uploaded media is served from.
    pub base_url: String,
    /// Public site root used to build item URLs.
    pub site_url: String,
    /// Route template for `post` items; `{slug}` is replaced by the slug.
    pub post_route: String,
    pub share_endpoint: String,
    pub share_cache_ttl_minutes: u64,
    pub share_timeout_seconds: u64,
    pub main_category: MainCategoryRule,
    pub navigation_key: NavigationKey,
}

impl Default for ScribbleConfig {
    fn default() -> Self {
        Self {
            connection: DEFAULT_CONNECTION.to_string(),
            connections: BTreeMap::new(),
            base_url: String::new(),
            site_url: String::new(),
            post_route: DEFAULT_POST_ROUTE.to_string(),
            share_endpoint: ShareThisClient::DEFAULT_ENDPOINT.to_string(),
            share_cache_ttl_minutes: DEFAULT_SHARE_CACHE_TTL.as_secs() / 60,
            share_timeout_seconds: 5,
            main_category: MainCategoryRule::default(),
            navigation_key: NavigationKey::default(),
        }
    }
}

impl ScribbleConfig {
    /// Parses YAML; missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Loads a config file, resolves relative connection paths and applies
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.apply_overrides(|key| std::env::var(key).ok());
        info!(
            "event=config_load module=config status=ok path={} connection={}",
            path.display(),
            config.connection
        );
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production). Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(connection) = non_blank(DATABASE_ENV) {
            self.connection = connection.trim().to_string();
        }
        if let Some(base_url) = non_blank(BASE_URL_ENV) {
            self.base_url = base_url.trim().to_string();
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in self.connections.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Database path of the selected connection.
    pub fn database_path(&self) -> Result<&Path, ConfigError> {
        self.connections
            .get(&self.connection)
            .map(PathBuf::as_path)
            .ok_or_else(|| ConfigError::UnknownConnection(self.connection.clone()))
    }

    pub fn share_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.share_cache_ttl_minutes.saturating_mul(60))
    }

    pub fn share_timeout(&self) -> Duration {
        Duration::from_secs(self.share_timeout_seconds)
    }
}

/// Opens the database bound to the configured connection name.
pub fn open_connection(config: &ScribbleConfig) -> Result<Connection, ConfigError> {
    let path = config.database_path()?;
    Ok(open_db(path)?)
}

/// Searches the current directory and its parents for `scribble.yaml`.
pub fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScribbleConfig, BASE_URL_ENV, DATABASE_ENV};
    use crate::model::term::MainCategoryRule;
    use crate::repo::query::NavigationKey;
    use std::time::Duration;

    #[test]
    fn defaults_bind_to_wordpress_connection() {
        let config = ScribbleConfig::default();
        assert_eq!(config.connection, "wordpress");
        assert_eq!(config.post_route, "/blog/{slug}");
        assert_eq!(config.share_cache_ttl(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn yaml_overrides_selected_fields_only() {
        let config = ScribbleConfig::from_yaml_str(
            "connection: archive\nmain_category: alphabetical\nnavigation_key: id\n",
        )
        .unwrap();
        assert_eq!(config.connection, "archive");
        assert_eq!(config.main_category, MainCategoryRule::Alphabetical);
        assert_eq!(config.navigation_key, NavigationKey::Id);
        assert_eq!(config.share_timeout_seconds, 5);
    }

    #[test]
    fn environment_overrides_win_and_blank_values_are_ignored() {
        let mut config = ScribbleConfig::default();
        config.apply_overrides(|key| match key {
            DATABASE_ENV => Some(" legacy ".to_string()),
            BASE_URL_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.connection, "legacy");
        assert_eq!(config.base_url, "");
    }

    #[test]
    fn unknown_connection_is_reported() {
        let config = ScribbleConfig::default();
        let err = config.database_path().unwrap_err();
        assert!(err.to_string().contains("wordpress"));
    }
}
