use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crosscrawl_core as game;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StorageSettings {
    /// JSON file holding the best score.
    pub scores: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            scores: PathBuf::from("crosscrawl-scores.json"),
        }
    }
}

/// Contents of the optional TOML settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub run: game::RunConfig,
    pub storage: StorageSettings,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("No settings file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::parse(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        Ok(Self {
            run: settings.run.validated(),
            ..settings
        })
    }
}
