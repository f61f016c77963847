//! Streaming assistant-message parser.
//!
//! [`AssistantMessageParser`] consumes an incrementally-arriving text stream
//! from an LLM and reconstructs an ordered sequence of [`ContentBlock`]s:
//! plain prose interleaved with XML-style tool invocations. It is driven
//! once per inbound chunk, resumes exactly where the previous call left
//! off, and never errors — unrecognized tag-like text is downgraded to
//! literal content so adversarial model output always renders as
//! *something*.
//!
//! The parser holds the cumulative stream text and an absolute scan cursor.
//! Finalized text is never rescanned; each [`process_chunk`] call costs
//! time proportional to the new text plus a bounded holdback re-check (at
//! most one closing-tag length).
//!
//! [`process_chunk`]: AssistantMessageParser::process_chunk

mod scanner;

#[cfg(test)]
mod tests;

use crate::blocks::{ContentBlock, ToolUseBlock};
use crate::registry::TagRegistry;
use scanner::TagScan;

/// Where the scanner currently is inside the stream.
#[derive(Debug, Clone, PartialEq, Default)]
enum State {
    /// Accumulating plain text (possibly with no block materialized yet).
    #[default]
    Text,
    /// Inside a recognized tool, between parameters.
    ToolBody { tool: String },
    /// Accumulating a parameter's value.
    ParamValue {
        tool: String,
        param: String,
        raw: bool,
    },
    /// Inside a schema-less tool; the whole body is one raw payload.
    RawBody { tool: String },
}

/// Outcome of one state-handler step.
enum Step {
    /// Progress was made; run the state machine again.
    Continue,
    /// Out of usable input; wait for the next chunk.
    Stalled,
}

/// Incremental parser turning a raw assistant text stream into content blocks.
///
/// One instance per conversation turn: the [`TagRegistry`] (including any
/// custom tools) is fixed at construction and the block sequence belongs to
/// exactly one streaming session. Call [`process_chunk`] for every stream
/// fragment, then [`finalize_blocks`] once the stream ends (or is aborted)
/// to close whatever is still open.
///
/// [`process_chunk`]: Self::process_chunk
/// [`finalize_blocks`]: Self::finalize_blocks
#[derive(Debug)]
pub struct AssistantMessageParser {
    registry: TagRegistry,
    /// Cumulative stream text for this session.
    buffer: String,
    /// Absolute byte offset of the first unconsumed character.
    cursor: usize,
    blocks: Vec<ContentBlock>,
    state: State,
    finalized: bool,
}

impl AssistantMessageParser {
    /// Creates a parser over the given registry.
    pub fn new(registry: TagRegistry) -> Self {
        Self {
            registry,
            buffer: String::new(),
            cursor: 0,
            blocks: Vec::new(),
            state: State::Text,
            finalized: false,
        }
    }

    /// Creates a parser over the built-in tools only.
    pub fn with_builtins() -> Self {
        Self::new(TagRegistry::new())
    }

    /// Appends `chunk` to the stream and advances parsing as far as the
    /// available text permits.
    ///
    /// Returns the full ordered block sequence so far. Blocks finalized by
    /// earlier calls are returned unchanged; only the last block may have
    /// grown or been completed. Passing `""` returns the sequence as-is.
    pub fn process_chunk(&mut self, chunk: &str) -> &[ContentBlock] {
        self.buffer.push_str(chunk);
        self.finalized = false;
        self.advance();
        &self.blocks
    }

    /// The block sequence produced so far.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Closes any block still marked partial, treating it as complete with
    /// whatever content accumulated.
    ///
    /// Called once the stream has ended (or was aborted). A truncated tool
    /// or parameter is not an error: its block simply completes with the
    /// text received. Safe to call with nothing open, and idempotent.
    pub fn finalize_blocks(&mut self) {
        if self.finalized {
            return;
        }
        let end = self.buffer.len();
        match std::mem::take(&mut self.state) {
            State::Text => {
                // A withheld `<...` suffix that never resolved is literal.
                self.append_text(self.cursor, end);
                self.complete_last();
            }
            State::ToolBody { .. } => {
                // Any trailing filler or half-arrived tag is discarded.
                self.complete_last();
            }
            State::ParamValue { param, raw, .. } => {
                self.append_param(&param, self.cursor, end);
                if raw {
                    // A raw value that did arrive with its own closer keeps
                    // only the text before the last occurrence.
                    self.strip_raw_param_tail(&param);
                }
                self.complete_last();
            }
            State::RawBody { .. } => {
                self.append_raw(self.cursor, end);
                self.complete_last();
            }
        }
        self.cursor = end;
        self.finalized = true;
    }

    /// Clears all state for a fresh message, keeping the registry.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.blocks.clear();
        self.state = State::Text;
        self.finalized = false;
    }

    /// Runs the state machine until it runs out of usable input.
    fn advance(&mut self) {
        loop {
            let step = match std::mem::take(&mut self.state) {
                State::Text => self.step_text(),
                State::ToolBody { tool } => self.step_tool_body(tool),
                State::ParamValue { tool, param, raw } => self.step_param_value(tool, param, raw),
                State::RawBody { tool } => self.step_raw_body(tool),
            };
            if matches!(step, Step::Stalled) {
                break;
            }
        }
    }

    /// `Text`: commit literal characters until a `<` that opens a known
    /// tool; undecidable tag prefixes park the cursor.
    fn step_text(&mut self) -> Step {
        let rest = &self.buffer[self.cursor..];
        let Some(rel) = rest.find('<') else {
            let end = self.buffer.len();
            self.append_text(self.cursor, end);
            self.cursor = end;
            self.state = State::Text;
            return Step::Stalled;
        };

        let lt = self.cursor + rel;
        self.append_text(self.cursor, lt);
        self.cursor = lt;

        enum Found {
            Tool { name: String, end: usize },
            Literal,
            Wait,
        }
        let found = match scanner::scan_tag(&self.buffer, lt) {
            TagScan::Opening { name, end } if self.registry.is_tool(name) => Found::Tool {
                name: name.to_string(),
                end,
            },
            TagScan::NeedMore => Found::Wait,
            // Unknown opening tags, all closing tags, and malformed
            // angle-bracket runs render as plain text.
            TagScan::Opening { .. } | TagScan::Closing { .. } | TagScan::NotATag => Found::Literal,
        };

        match found {
            Found::Wait => {
                self.state = State::Text;
                Step::Stalled
            }
            Found::Literal => {
                self.append_text(lt, lt + 1);
                self.cursor = lt + 1;
                self.state = State::Text;
                Step::Continue
            }
            Found::Tool { name, end } => {
                self.complete_last();
                self.cursor = end;
                let structured = self
                    .registry
                    .schema(&name)
                    .map(|s| s.has_params())
                    .unwrap_or(false);
                let mut block = ToolUseBlock {
                    name: name.clone(),
                    params: Default::default(),
                    raw_body: None,
                    id: None,
                    partial: true,
                };
                if !structured {
                    block.raw_body = Some(String::new());
                }
                self.blocks.push(ContentBlock::ToolUse(block));
                self.state = if structured {
                    State::ToolBody { tool: name }
                } else {
                    State::RawBody { tool: name }
                };
                Step::Continue
            }
        }
    }

    /// `ToolBody`: skip filler until a parameter opens or the tool closes.
    ///
    /// Tool bodies are structurally parameter-only; text between parameters
    /// (newlines, stray tags) is consumed and never surfaced.
    fn step_tool_body(&mut self, tool: String) -> Step {
        let rest = &self.buffer[self.cursor..];
        let Some(rel) = rest.find('<') else {
            self.cursor = self.buffer.len();
            self.state = State::ToolBody { tool };
            return Step::Stalled;
        };
        self.cursor += rel;

        enum Found {
            CloseTool { end: usize },
            OpenParam { name: String, raw: bool, end: usize },
            Filler,
            Wait,
        }
        let found = match scanner::scan_tag(&self.buffer, self.cursor) {
            TagScan::Closing { name, end } if name == tool => Found::CloseTool { end },
            TagScan::Opening { name, end } => match self.registry.schema(&tool) {
                Some(schema) if schema.is_param(name) => Found::OpenParam {
                    name: name.to_string(),
                    raw: schema.is_raw_param(name),
                    end,
                },
                _ => Found::Filler,
            },
            TagScan::NeedMore => Found::Wait,
            TagScan::Closing { .. } | TagScan::NotATag => Found::Filler,
        };

        match found {
            Found::Wait => {
                self.state = State::ToolBody { tool };
                Step::Stalled
            }
            Found::Filler => {
                self.cursor += 1;
                self.state = State::ToolBody { tool };
                Step::Continue
            }
            Found::CloseTool { end } => {
                self.complete_last();
                self.cursor = end;
                self.state = State::Text;
                Step::Continue
            }
            Found::OpenParam { name, raw, end } => {
                self.cursor = end;
                if let Some(ContentBlock::ToolUse(t)) = self.blocks.last_mut() {
                    t.params.open(&name);
                }
                self.state = State::ParamValue {
                    tool,
                    param: name,
                    raw,
                };
                Step::Continue
            }
        }
    }

    /// `ParamValue`: accumulate verbatim until the value's terminator.
    ///
    /// A non-raw value ends at the first occurrence of its own closing tag.
    /// A raw value runs all the way to the tool's closing tag — so code,
    /// markup, or JSON inside it can never open spurious blocks — and the
    /// last occurrence of the parameter's own closer is then stripped. A
    /// raw parameter is therefore effectively the final parameter of its
    /// invocation.
    fn step_param_value(&mut self, tool: String, param: String, raw: bool) -> Step {
        let closer = if raw {
            format!("</{}>", tool)
        } else {
            format!("</{}>", param)
        };
        let rest = &self.buffer[self.cursor..];

        match rest.find(&closer) {
            Some(rel) => {
                let stop = self.cursor + rel;
                self.append_param(&param, self.cursor, stop);
                if raw {
                    self.strip_raw_param_tail(&param);
                    // Leave the tool closer for the body scanner.
                    self.cursor = stop;
                } else {
                    self.cursor = stop + closer.len();
                }
                self.state = State::ToolBody { tool };
                Step::Continue
            }
            None => {
                // Withhold any suffix that could be the start of the closer
                // so it is never half-committed into the value.
                let commit = rest.len() - scanner::holdback(rest, &closer);
                let stop = self.cursor + commit;
                self.append_param(&param, self.cursor, stop);
                self.cursor = stop;
                self.state = State::ParamValue { tool, param, raw };
                Step::Stalled
            }
        }
    }

    /// `RawBody`: a schema-less tool's entire body, verbatim, up to its
    /// own closing tag.
    fn step_raw_body(&mut self, tool: String) -> Step {
        let closer = format!("</{}>", tool);
        let rest = &self.buffer[self.cursor..];

        match rest.find(&closer) {
            Some(rel) => {
                let stop = self.cursor + rel;
                self.append_raw(self.cursor, stop);
                self.cursor = stop + closer.len();
                self.complete_last();
                self.state = State::Text;
                Step::Continue
            }
            None => {
                let commit = rest.len() - scanner::holdback(rest, &closer);
                let stop = self.cursor + commit;
                self.append_raw(self.cursor, stop);
                self.cursor = stop;
                self.state = State::RawBody { tool };
                Step::Stalled
            }
        }
    }

    // --- block mutation helpers ---
    //
    // Empty ranges are no-ops, so a text block is never materialized until
    // the first literal character is committed; a tool tag at the very start
    // of the stream yields no leading empty text block.

    /// Appends `buffer[from..to]` to the open text block, creating it first
    /// if the last block is not an open text block.
    fn append_text(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let needs_block = !matches!(
            self.blocks.last(),
            Some(ContentBlock::Text(t)) if t.partial
        );
        if needs_block {
            self.blocks.push(ContentBlock::text(""));
        }
        let text = &self.buffer[from..to];
        if let Some(ContentBlock::Text(t)) = self.blocks.last_mut() {
            t.content.push_str(text);
        }
    }

    /// Appends `buffer[from..to]` to the named parameter of the open tool.
    fn append_param(&mut self, param: &str, from: usize, to: usize) {
        if from == to {
            return;
        }
        let text = &self.buffer[from..to];
        if let Some(ContentBlock::ToolUse(t)) = self.blocks.last_mut() {
            t.params.append(param, text);
        }
    }

    /// Appends `buffer[from..to]` to the open tool's raw body.
    fn append_raw(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let text = &self.buffer[from..to];
        if let Some(ContentBlock::ToolUse(t)) = self.blocks.last_mut() {
            if let Some(body) = t.raw_body.as_mut() {
                body.push_str(text);
            }
        }
    }

    /// Drops everything from the last occurrence of the raw parameter's own
    /// closing tag onward (the closer itself plus any trailing filler).
    fn strip_raw_param_tail(&mut self, param: &str) {
        let closer = format!("</{}>", param);
        if let Some(ContentBlock::ToolUse(t)) = self.blocks.last_mut() {
            let cut = t.params.get(param).and_then(|v| v.rfind(&closer));
            if let Some(i) = cut {
                t.params.truncate_value(param, i);
            }
        }
    }

    /// Marks the last block complete, if any.
    fn complete_last(&mut self) {
        if let Some(block) = self.blocks.last_mut() {
            block.set_complete();
        }
    }
}
