use std::path::{Path, PathBuf};

use homedir::my_home;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    similarity::DEFAULT_RECOMMENDATIONS,
    storage::{BackendLocal, StorageManager},
};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_MOVIES_PATH: &str = "movies.csv";
const DEFAULT_SIMILARITY_PATH: &str = "similarity.csv";
const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

/// Overrides the data directory (defaults to `~/.local/share/reel`).
pub const BASE_PATH_ENV: &str = "REEL_BASE_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory, set REEL_BASE_PATH")]
    NoHomeDir,

    #[error("config storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Movie titles, CSV with a `title` column
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Similarity matrix, one CSV row per movie
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Number of recommendations shown when `-k` is not given
    #[serde(default = "default_recommendations")]
    pub recommendations: usize,

    /// Search engine used for outbound links; the title is added as `q`
    #[serde(default = "default_search_url")]
    pub search_url: String,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movies_path: default_movies_path(),
            similarity_path: default_similarity_path(),
            recommendations: default_recommendations(),
            search_url: default_search_url(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_movies_path() -> String {
    DEFAULT_MOVIES_PATH.to_string()
}

fn default_similarity_path() -> String {
    DEFAULT_SIMILARITY_PATH.to_string()
}

fn default_recommendations() -> usize {
    DEFAULT_RECOMMENDATIONS
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.recommendations == 0 {
            return Err(ConfigError::Invalid {
                field: "recommendations",
                message: "must be greater than 0".to_string(),
            });
        }

        if self.movies_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "movies_path",
                message: "must not be empty".to_string(),
            });
        }

        if self.similarity_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "similarity_path",
                message: "must not be empty".to_string(),
            });
        }

        self.search_url()?;

        Ok(())
    }

    /// Data directory from `REEL_BASE_PATH`, falling back to `~/.local/share/reel`.
    pub fn default_base_path() -> Result<PathBuf, ConfigError> {
        if let Ok(base_path) = std::env::var(BASE_PATH_ENV) {
            return Ok(PathBuf::from(base_path));
        }

        let home = my_home()
            .map_err(|_| ConfigError::NoHomeDir)?
            .ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".local/share/reel"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::default_base_path()?)
    }

    /// Load `config.yaml` from `base_path`, writing the defaults first if it
    /// does not exist yet.
    pub fn load_with(base_path: &Path) -> Result<Self, ConfigError> {
        let store = BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {}", store.resolve(CONFIG_FILE).display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave so missing fields get their defaults written out
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Movies file, relative paths resolved against the data directory.
    pub fn movies_file(&self) -> PathBuf {
        self.base_path.join(&self.movies_path)
    }

    /// Similarity file, relative paths resolved against the data directory.
    pub fn similarity_file(&self) -> PathBuf {
        self.base_path.join(&self.similarity_path)
    }

    pub fn search_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.search_url).map_err(|e| ConfigError::Invalid {
            field: "search_url",
            message: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                field: "search_url",
                message: format!("{} is not a web address", self.search_url),
            });
        }

        Ok(url)
    }
}
