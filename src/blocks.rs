//! Content block types for nami's parsed assistant output.
//!
//! Provides the [`ContentBlock`] enum with [`TextBlock`] and [`ToolUseBlock`]
//! variants that represent the structured sequence reconstructed from a raw
//! assistant text stream. These are nami's output types, consumed by the
//! rendering layer and by tool dispatch once a block stops being partial.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single block in the parsed assistant message.
///
/// Blocks are produced in stream order and a block's index in the output
/// slice is stable for the whole session: new blocks are only ever appended,
/// and only the last block may still change while [`partial`](ContentBlock::is_partial)
/// is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A run of plain assistant prose.
    Text(TextBlock),
    /// A structured tool invocation.
    ToolUse(ToolUseBlock),
}

/// Accumulated plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// The text received so far.
    pub content: String,
    /// True while the run may still grow as more of the stream arrives.
    pub partial: bool,
}

/// A tool invocation reconstructed from the stream.
///
/// For tools with a parameter schema the body is broken into `params`;
/// schema-less (custom) tools keep their entire body verbatim in
/// `raw_body`. The native protocol also accumulates argument JSON in
/// `raw_body` before exploding it into `params` on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUseBlock {
    /// Tool tag name. Decided when the opening tag is seen; never changes.
    pub name: String,
    /// Parameter values in the order they were encountered.
    #[serde(default, skip_serializing_if = "ParamMap::is_empty")]
    pub params: ParamMap,
    /// Undifferentiated payload for schema-less tools / native argument JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
    /// Provider-assigned call id (native protocol only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// True until the closing construct (or end of stream) is seen.
    pub partial: bool,
}

impl ContentBlock {
    /// Creates a new partial text block.
    pub fn text(content: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock {
            content: content.into(),
            partial: true,
        })
    }

    /// Creates a new partial tool-use block with no parameters yet.
    pub fn tool_use(name: impl Into<String>) -> Self {
        ContentBlock::ToolUse(ToolUseBlock {
            name: name.into(),
            params: ParamMap::new(),
            raw_body: None,
            id: None,
            partial: true,
        })
    }

    /// Whether this block may still change.
    pub fn is_partial(&self) -> bool {
        match self {
            ContentBlock::Text(t) => t.partial,
            ContentBlock::ToolUse(t) => t.partial,
        }
    }

    /// Marks the block complete.
    pub fn set_complete(&mut self) {
        match self {
            ContentBlock::Text(t) => t.partial = false,
            ContentBlock::ToolUse(t) => t.partial = false,
        }
    }

    /// Returns the tool-use payload, if this is a tool block.
    pub fn as_tool_use(&self) -> Option<&ToolUseBlock> {
        match self {
            ContentBlock::ToolUse(t) => Some(t),
            ContentBlock::Text(_) => None,
        }
    }

    /// Returns the text content, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(t) => Some(&t.content),
            ContentBlock::ToolUse(_) => None,
        }
    }
}

/// An insertion-ordered parameter-name → value mapping.
///
/// Backed by a `Vec` because tool invocations carry a handful of parameters
/// at most and the stream order is part of the output contract. Re-inserting
/// an existing name resets its value in place, keeping the original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamMap(Vec<(String, String)>);

impl ParamMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Starts (or restarts) a parameter.
    ///
    /// A repeated parameter name overwrites: the value is cleared but the
    /// entry keeps its original position in the stream order.
    pub fn open(&mut self, name: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => v.clear(),
            None => self.0.push((name.to_string(), String::new())),
        }
    }

    /// Appends stream text to an existing parameter's value.
    pub fn append(&mut self, name: &str, text: &str) {
        if let Some((_, v)) = self.0.iter_mut().find(|(n, _)| n == name) {
            v.push_str(text);
        }
    }

    /// Replaces a parameter's value outright (native protocol path).
    pub fn set(&mut self, name: &str, value: String) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Truncates a parameter's value to `len` bytes.
    pub fn truncate_value(&mut self, name: &str, len: usize) {
        if let Some((_, v)) = self.0.iter_mut().find(|(n, _)| n == name) {
            v.truncate(len);
        }
    }

    /// Iterates parameters in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ParamMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// Serialize as a JSON/TOML map so downstream consumers see
// `{"path": "a.rs", ...}`. serde_json preserves the emit order, which is
// the stream order.
impl Serialize for ParamMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParamMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamMapVisitor;

        impl<'de> Visitor<'de> for ParamMapVisitor {
            type Value = ParamMap;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of parameter names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    entries.push((name, value));
                }
                Ok(ParamMap(entries))
            }
        }

        deserializer.deserialize_map(ParamMapVisitor)
    }
}
