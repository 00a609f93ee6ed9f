use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, path::PathBuf};

/// Durable slot for the single pinned city name. Survives process restarts.
#[async_trait]
pub trait SelectionStore: Send + Sync + Debug {
    async fn read(&self) -> Result<Option<String>>;
    async fn write(&self, name: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// On-disk record. The timestamp is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedSelection {
    city: String,
    saved_at: DateTime<Utc>,
}

/// TOML file under the platform config directory.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    /// Store at the default platform location.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-tracker", "tracker-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self { path: dirs.config_dir().join("selection.toml") })
    }

    /// Store at an explicit path. Used by tests.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SelectionStore for FileSelectionStore {
    async fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read selection file: {}", self.path.display()))?;

        let saved: SavedSelection = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse selection file: {}", self.path.display()))?;

        Ok(Some(saved.city))
    }

    async fn write(&self, name: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create selection directory: {}", parent.display())
            })?;
        }

        let saved = SavedSelection { city: name.to_string(), saved_at: Utc::now() };
        let toml = toml::to_string_pretty(&saved).context("Failed to serialize selection")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write selection file: {}", self.path.display()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove selection file: {}", self.path.display())
            })?;
        }

        Ok(())
    }
}
