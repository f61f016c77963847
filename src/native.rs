//! Native structured tool-call accumulation.
//!
//! Some providers deliver tool invocations as typed stream events (a call
//! id and name up front, then argument-JSON fragments) rather than as XML
//! tags inside the text. [`NativeStreamParser`] folds those events into the
//! same [`ContentBlock`] sequence the XML parser produces, so the rendering
//! and dispatch layers never care which protocol a provider speaks.
//!
//! Same contract as the XML path: the sequence is append-only, at most the
//! last block is partial, and nothing here ever errors — a truncated or
//! malformed argument payload finalizes with the fragment preserved in
//! `raw_body` instead of failing the session.

use serde_json::Value;

use crate::blocks::{ContentBlock, ToolUseBlock};

/// One event from a provider's structured streaming response.
///
/// The provider client maps its wire format (SSE deltas, etc.) onto these;
/// that mapping is the client's concern, not this module's.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// A fragment of plain assistant text.
    TextDelta(String),
    /// A tool call begins; the name is known immediately and never changes.
    ToolCallStart { id: String, name: String },
    /// A fragment of the current tool call's argument JSON.
    ToolCallDelta(String),
    /// The current tool call's arguments are complete.
    ToolCallEnd,
    /// The stream is over; close whatever is open.
    Done,
}

/// Accumulates [`NativeEvent`]s into content blocks.
#[derive(Debug, Default)]
pub struct NativeStreamParser {
    blocks: Vec<ContentBlock>,
    finalized: bool,
}

impl NativeStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the sequence and returns the updated blocks.
    pub fn handle_event(&mut self, event: NativeEvent) -> &[ContentBlock] {
        if !matches!(event, NativeEvent::Done) {
            self.finalized = false;
        }
        match event {
            NativeEvent::TextDelta(text) => self.append_text(&text),
            NativeEvent::ToolCallStart { id, name } => {
                self.close_open_block();
                self.blocks.push(ContentBlock::ToolUse(ToolUseBlock {
                    name,
                    params: Default::default(),
                    raw_body: Some(String::new()),
                    id: Some(id),
                    partial: true,
                }));
            }
            NativeEvent::ToolCallDelta(fragment) => {
                if let Some(ContentBlock::ToolUse(t)) = self.blocks.last_mut() {
                    if let Some(body) = t.raw_body.as_mut() {
                        body.push_str(&fragment);
                    }
                }
            }
            NativeEvent::ToolCallEnd => self.close_open_block(),
            NativeEvent::Done => self.finalize_blocks(),
        }
        &self.blocks
    }

    /// The block sequence produced so far.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Closes any block still marked partial. Safe to call with nothing
    /// open, and idempotent.
    pub fn finalize_blocks(&mut self) {
        if self.finalized {
            return;
        }
        self.close_open_block();
        self.finalized = true;
    }

    /// Clears all state for a fresh message.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.finalized = false;
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.blocks.last_mut() {
            Some(ContentBlock::Text(t)) if t.partial => t.content.push_str(text),
            _ => {
                self.close_open_block();
                self.blocks.push(ContentBlock::text(text));
            }
        }
    }

    /// Completes the trailing partial block, exploding accumulated argument
    /// JSON into `params` for tool blocks.
    fn close_open_block(&mut self) {
        let Some(block) = self.blocks.last_mut() else {
            return;
        };
        if !block.is_partial() {
            return;
        }
        if let ContentBlock::ToolUse(t) = block {
            explode_arguments(t);
        }
        block.set_complete();
    }
}

/// Populates `params` from the accumulated argument JSON, if it parses as
/// an object. String values are kept verbatim; everything else keeps its
/// JSON rendering. A payload that does not parse (truncated stream) leaves
/// `params` empty with the fragment still in `raw_body`.
fn explode_arguments(tool: &mut ToolUseBlock) {
    let Some(body) = tool.raw_body.as_deref() else {
        return;
    };
    let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(body) else {
        return;
    };
    for (name, value) in entries {
        let rendered = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        tool.params.set(&name, rendered);
    }
}
