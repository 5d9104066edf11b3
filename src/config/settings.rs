use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::resolve::{Layer, Resolution};

/// Contents of `config.toml`.
///
/// Every field is optional: the file only fills gaps left by flags and
/// environment variables.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Fully resolved connection settings, handed to the API client
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token: String,
    pub project: String,
}

/// Where the config file lives and what it holds
pub struct ConfigFile {
    pub path: PathBuf,
    pub config: Option<Config>,
}

impl ConfigFile {
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "pivo")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .context("Failed to determine config directory")
    }

    /// Open the platform config file; a missing file is not an error.
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_path()?)
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        let config = match fs::read_to_string(&path) {
            Ok(raw) => Some(
                toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        Ok(Self { path, config })
    }

    pub fn exists(&self) -> bool {
        self.config.is_some()
    }

    /// Resolve against flags and the environment, file values filling the gaps.
    pub fn resolve(&self, flags: &Layer, env: &Layer) -> Resolution {
        let empty = TrackerConfig::default();
        let file = self.config.as_ref().map_or(&empty, |c| &c.tracker);
        Resolution::from_layers(flags, env, &Layer::from(file))
    }

    pub fn write(path: &Path, config: &Config) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let body = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

impl From<&TrackerConfig> for Layer {
    fn from(file: &TrackerConfig) -> Self {
        Layer {
            api_url: file.api_url.clone(),
            token: file.token.clone(),
            project: file.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve::Source;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::open_at(dir.path().join("config.toml")).unwrap();
        assert!(!file.exists());

        let resolution = file.resolve(&Layer::default(), &Layer::default());
        assert_eq!(resolution.api_url.source(), Some(Source::Default));
        assert_eq!(resolution.token.source(), None);
    }

    #[test]
    fn test_write_then_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            tracker: TrackerConfig {
                project: Some("1234".to_string()),
                ..Default::default()
            },
        };

        ConfigFile::write(&path, &config).unwrap();
        let file = ConfigFile::open_at(path).unwrap();
        assert_eq!(file.config, Some(config));

        let resolution = file.resolve(&Layer::default(), &Layer::default());
        assert_eq!(resolution.project.value(), Some("1234"));
        assert_eq!(resolution.project.source(), Some(Source::File));
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tracker\nproject = 1").unwrap();

        let err = ConfigFile::open_at(path).err().unwrap();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_partial_file_parses() {
        let parsed: Config = toml::from_str("[tracker]\nproject = \"42\"\n").unwrap();
        assert_eq!(parsed.tracker.project.as_deref(), Some("42"));
        assert!(parsed.tracker.token.is_none());
        assert!(parsed.tracker.api_url.is_none());

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty, Config::default());
    }
}
