//! Tag and parameter registry for the assistant-message parser.
//!
//! The parser only treats an angle-bracket tag as structure when the tag
//! name is registered here; everything else stays literal text. The
//! registry is built once per conversation turn — from the built-in tool
//! table plus any caller-supplied custom tools — and is read-only for the
//! lifetime of the parser instance that owns it.

/// Schema for a single tool tag.
///
/// `params` lists the recognized parameter tag names in no particular
/// order; `raw_param` names the one parameter (if any) whose value is
/// captured verbatim up to the tool's closing tag because it may itself
/// contain tag-like text (file contents, diffs, JSON).
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub params: Vec<String>,
    pub raw_param: Option<String>,
    /// True for caller-supplied tools (user-defined or MCP-provided).
    pub custom: bool,
}

impl ToolSchema {
    /// Builds a schema for a custom tool.
    ///
    /// With an empty `params` list the tool is schema-less: its whole body
    /// is captured as a single raw payload.
    pub fn custom(
        name: impl Into<String>,
        params: Vec<String>,
        raw_param: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            raw_param,
            custom: true,
        }
    }

    fn builtin(name: &str, params: &[&str], raw_param: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            raw_param: raw_param.map(str::to_string),
            custom: false,
        }
    }

    /// Whether `name` is a recognized parameter tag for this tool.
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    /// Whether `name` is this tool's raw parameter.
    pub fn is_raw_param(&self, name: &str) -> bool {
        self.raw_param.as_deref() == Some(name)
    }

    /// Whether this tool has any structured parameters at all.
    ///
    /// A tool without parameters is parsed in raw-body mode: everything up
    /// to its closing tag becomes one undifferentiated payload.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Registry of every tag name the parser recognizes as a tool.
///
/// Lookup is case-sensitive exact match; there is no partial or fuzzy
/// matching, and no mutation after construction.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    tools: Vec<ToolSchema>,
}

impl TagRegistry {
    /// Creates a registry with only the built-in tools.
    pub fn new() -> Self {
        Self {
            tools: builtin_schemas(),
        }
    }

    /// Creates a registry with the built-in tools plus custom schemas.
    ///
    /// A custom schema whose name collides with a built-in (or an earlier
    /// custom entry) is ignored; the first registration wins, so a custom
    /// tool can never shadow a built-in's parameter schema mid-session.
    pub fn with_custom_tools(custom: impl IntoIterator<Item = ToolSchema>) -> Self {
        let mut registry = Self::new();
        for schema in custom {
            if registry.schema(&schema.name).is_none() {
                registry.tools.push(schema);
            }
        }
        registry
    }

    /// Whether `name` is a registered tool tag.
    pub fn is_tool(&self, name: &str) -> bool {
        self.schema(name).is_some()
    }

    /// Looks up a tool's schema by exact name.
    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All registered schemas, built-ins first, in registration order.
    pub fn schemas(&self) -> &[ToolSchema] {
        &self.tools
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in tool table for the XML tool protocol.
///
/// `write_to_file`'s `content`, `replace_in_file`'s `diff`, and
/// `use_mcp_tool`'s `arguments` are raw parameters: their values routinely
/// contain code, markup, or JSON that must not be scanned for nested tags.
fn builtin_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema::builtin("execute_command", &["command", "requires_approval"], None),
        ToolSchema::builtin("read_file", &["path"], None),
        ToolSchema::builtin("write_to_file", &["path", "content"], Some("content")),
        ToolSchema::builtin("replace_in_file", &["path", "diff"], Some("diff")),
        ToolSchema::builtin("search_files", &["path", "regex", "file_pattern"], None),
        ToolSchema::builtin("list_files", &["path", "recursive"], None),
        ToolSchema::builtin("list_code_definition_names", &["path"], None),
        ToolSchema::builtin("ask_followup_question", &["question", "options"], None),
        ToolSchema::builtin("attempt_completion", &["result", "command"], None),
        ToolSchema::builtin("new_task", &["context"], None),
        ToolSchema::builtin(
            "use_mcp_tool",
            &["server_name", "tool_name", "arguments"],
            Some("arguments"),
        ),
        ToolSchema::builtin("access_mcp_resource", &["server_name", "uri"], None),
    ]
}
