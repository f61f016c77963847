//! Struct definitions and serde defaults for nami configuration.

use serde::{Deserialize, Serialize};

use crate::registry::ToolSchema;

/// Root configuration for nami, deserialized from `config.toml`.
///
/// Everything defaults so nami runs fine with no config file at all.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Custom tool tags to recognize in addition to the built-ins,
    /// typically user-defined or MCP-provided tools.
    #[serde(default)]
    pub custom_tools: Vec<CustomToolEntry>,
    /// Defaults for the `replay` subcommand.
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// One `[[custom_tools]]` entry.
///
/// With no `params` the tool is schema-less and its body is captured as a
/// single raw payload; declaring `params` (and optionally `raw_param`)
/// makes it parse like a built-in.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomToolEntry {
    /// The tag name, matched case-sensitively.
    pub name: String,
    /// Recognized parameter tag names.
    #[serde(default)]
    pub params: Vec<String>,
    /// The one parameter whose value is captured verbatim to the tool's
    /// closing tag.
    #[serde(default)]
    pub raw_param: Option<String>,
}

impl CustomToolEntry {
    /// Converts this entry into a registry schema.
    pub fn to_schema(&self) -> ToolSchema {
        ToolSchema::custom(&self.name, self.params.clone(), self.raw_param.clone())
    }
}

/// Defaults for `nami replay`, overridable per-invocation via flags.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReplayConfig {
    /// Chunk size in bytes (split at UTF-8 boundaries).
    pub chunk_size: Option<usize>,
    /// Delay between chunks in milliseconds.
    pub delay_ms: Option<u64>,
}
