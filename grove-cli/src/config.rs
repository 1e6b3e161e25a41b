use anyhow::{Context, Result};
use grove_core::{GrowthParameters, landscape::LandscapeSettings};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Everything a run needs besides the seed, as read from a TOML file.
///
/// ```toml
/// steps = 150
/// every = 10
///
/// [growth]
/// gravity = 0.06
/// branch_after_range = [10, 22]
/// color = { r = 140, g = 107, b = 76 }
///
/// [landscape]
/// tree_count = 3
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub growth: GrowthParameters,
    pub landscape: LandscapeSettings,
    /// Growth steps per tree.
    pub steps: usize,
    /// Steps between emitted frames; `0` emits only the finished trees.
    pub every: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            growth: GrowthParameters::default(),
            landscape: LandscapeSettings::default(),
            steps: 150,
            every: 10,
        }
    }
}

impl SceneConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.growth.validate()?;
        config.landscape.validate()?;
        Ok(config)
    }
}
