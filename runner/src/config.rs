use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

/// looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "tunedb.yaml";

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Failed to open config file {0}: {1}")]
    FileNotFound(PathBuf, #[source] Error),
    #[error("Failed to parse config file: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),
    #[error("Database engine {0} is not supported by this build")]
    UnsupportedEngine(Engine),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct TunedbConfig {
    #[serde(alias = "db", default)]
    pub database: DatabaseConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    #[serde(alias = "sqlite3")]
    SQLite,
    DuckDB,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SQLite => f.write_str("sqlite"),
            Self::DuckDB => f.write_str("duckdb"),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            path: default_database_path(),
        }
    }
}

impl TunedbConfig {
    /// Load the configuration from `path`, or from `tunedb.yaml` if it exists,
    /// falling back to the defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigErrors> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);

                if !default.is_file() {
                    debug!("No {DEFAULT_CONFIG_FILE} found, using default configuration");

                    return Ok(Self::default());
                }

                default
            }
        };

        let file =
            File::open(&path).map_err(|error| ConfigErrors::FileNotFound(path.clone(), error))?;
        let config: Self = serde_yaml::from_reader(file)?;

        info!(path = ?path, engine = %config.database.engine, "Loaded configuration");

        Ok(config)
    }

    /// apply command line overrides
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database.path = path;
        }

        self
    }

    /// make sure the selected engine was compiled in
    pub fn preflight_checks(&self) -> Result<(), ConfigErrors> {
        match self.database.engine {
            #[cfg(feature = "rusqlite")]
            Engine::SQLite => Ok(()),
            #[cfg(feature = "duckdb")]
            Engine::DuckDB => Ok(()),
            #[allow(unreachable_patterns)]
            engine => Err(ConfigErrors::UnsupportedEngine(engine)),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("tunedb.db")
}
