//! Project configuration stored in `.rewind/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const CONFIG_DIR: &str = ".rewind";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewindConfig {
    #[serde(default)]
    pub migrations: MigrationSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Directory holding `<name>.up.<ext>` / `<name>.down.<ext>` scripts
    #[serde(default = "default_migrations_dir")]
    pub dir: String,
    /// Program and leading arguments used to run each script
    #[serde(default = "default_command")]
    pub command: Vec<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            dir: default_migrations_dir(),
            command: default_command(),
        }
    }
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_command() -> Vec<String> {
    vec!["sh".to_string()]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Json,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub kind: StorageKind,
    /// JSON ledger path, relative to the project root
    #[serde(default = "default_storage_path")]
    pub path: String,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key")]
    pub key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            path: default_storage_path(),
            url: default_redis_url(),
            key: default_redis_key(),
        }
    }
}

fn default_storage_path() -> String {
    ".rewind/executed.json".to_string()
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_redis_key() -> String {
    rewind::storage::DEFAULT_REDIS_KEY.to_string()
}

/// Located project with its loaded configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Directory containing `.rewind/`, or the start directory when none exists
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub config: RewindConfig,
    /// Whether `config_path` existed when the context was loaded
    pub initialized: bool,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Walk up from `start` looking for `.rewind/config.toml`.
    ///
    /// Falls back to an uninitialized context rooted at `start`.
    pub fn find_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(CONFIG_DIR).join(CONFIG_FILE).is_file() {
                return Self::from_root(current);
            }
            if !current.pop() {
                return Self::from_root(start.to_path_buf());
            }
        }
    }

    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);
        let initialized = config_path.is_file();

        let config: RewindConfig = if initialized {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            RewindConfig::default()
        };

        Ok(Self {
            project_root,
            config_path,
            config,
            initialized,
        })
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.migrations.dir)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.project_root.join(&self.config.storage.path)
    }

    /// Redis URL with `${VAR}` expanded from the environment.
    pub fn redis_url(&self) -> Result<String> {
        expand_env(&self.config.storage.url)
    }

    /// Write the current configuration, creating `.rewind/`.
    pub fn write_config(&self) -> Result<()> {
        let dir = self.project_root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let content =
            toml::to_string_pretty(&self.config).context("Failed to serialize configuration")?;
        std::fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }
}

/// Expand a whole-value `${VAR}` reference.
pub fn expand_env(value: &str) -> Result<String> {
    if let Some(var_name) = value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))
    } else {
        Ok(value.to_string())
    }
}
