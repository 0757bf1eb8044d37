use mcts::MctsConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of the TOML configuration file. Every table and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PocketConfig {
    pub search: MctsConfig,
    pub scramble: ScrambleConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrambleConfig {
    /// Random quarter turns applied to the solved cube.
    pub depth: usize,
    /// Rotate the whole cube at random before scrambling.
    pub random_orientation: bool,
    pub seed: Option<u64>,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            random_orientation: true,
            seed: None,
        }
    }
}

impl PocketConfig {
    /// Read the configuration at `path`, or the defaults if there is none.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a valid configuration.
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Self> {
        match path {
            Some(path) => Ok(toml::from_str(&std::fs::read_to_string(path)?)?),
            None => Ok(Self::default()),
        }
    }
}
