//! Configuration types and path resolution for nami.
//!
//! Nami stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/nami/config.toml` on Linux), with an optional
//! per-project `nami.toml` discovered by walking up to the git root. The
//! interesting payload is the custom tool list: tag names (beyond the
//! built-ins) the parser should treat as tool invocations rather than
//! plain text.

mod loader;
mod paths;
mod types;

pub use types::Config;
pub use types::CustomToolEntry;
pub use types::ReplayConfig;

use anyhow::Result;

use crate::registry::{TagRegistry, ToolSchema};

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }
        Ok(config)
    }

    /// Schemas for the configured custom tools.
    pub fn custom_schemas(&self) -> Vec<ToolSchema> {
        self.custom_tools.iter().map(|e| e.to_schema()).collect()
    }

    /// Builds a parser registry from the built-ins plus this config's
    /// custom tools and any extra names supplied on the command line.
    pub fn registry(&self, extra_tools: &[String]) -> TagRegistry {
        let schemas = self.custom_schemas().into_iter().chain(
            extra_tools
                .iter()
                .map(|name| ToolSchema::custom(name, vec![], None)),
        );
        TagRegistry::with_custom_tools(schemas)
    }
}
