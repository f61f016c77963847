//! File loading and merging for nami configuration.

use anyhow::{Context, Result};
use std::fs;

use super::types::Config;

/// Contents written to a fresh global config file.
const DEFAULT_CONFIG_TOML: &str = r#"# nami configuration
#
# Custom tool tags to recognize in assistant output, e.g.:
#
# [[custom_tools]]
# name = "add_numbers"
#
# [[custom_tools]]
# name = "render_chart"
# params = ["title", "spec"]
# raw_param = "spec"

[replay]
chunk_size = 64
delay_ms = 0
"#;

impl Config {
    /// Loads the global config from `~/.config/nami/config.toml`.
    ///
    /// If no config file exists, creates one with commented examples and
    /// returns its parsed contents.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)
                .with_context(|| "Failed to parse default config".to_string())?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {:?}", path))?;
        Ok(config)
    }

    /// Look for nami.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                let contents = fs::read_to_string(&candidate)
                    .with_context(|| format!("Failed to read config from {:?}", candidate))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config at {:?}", candidate))?;
                return Ok(Some(config));
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Merge project config over global config.
    ///
    /// Project custom tools take precedence on name collisions; replay
    /// settings override field by field where the project sets them.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        let mut custom_tools = project.custom_tools;
        for entry in global.custom_tools {
            if !custom_tools.iter().any(|e| e.name == entry.name) {
                custom_tools.push(entry);
            }
        }
        Config {
            custom_tools,
            replay: super::types::ReplayConfig {
                chunk_size: project.replay.chunk_size.or(global.replay.chunk_size),
                delay_ms: project.replay.delay_ms.or(global.replay.delay_ms),
            },
        }
    }
}
