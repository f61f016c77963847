//! nami — a streaming assistant-message parser for terminal AI coding agents.
//!
//! LLM coding agents receive their model's reply as an incremental text
//! stream that interleaves prose with XML-style tool invocations. This
//! crate reconstructs that stream into a structured, ordered sequence of
//! [`ContentBlock`]s, one [`process_chunk`] call per delta, tolerating
//! partial tags at chunk boundaries and truncated streams, and never
//! failing on malformed input — unrecognized tag-like text simply renders
//! as text.
//!
//! The main entry points:
//!
//! - [`AssistantMessageParser`] — the XML tag protocol state machine.
//! - [`NativeStreamParser`] — the same block model fed from structured
//!   tool-call stream events instead of tags.
//! - [`TagRegistry`] — which tag names count as tools, including custom
//!   (caller-supplied) ones.
//! - [`drive_stream`] — folds an async stream of fragments through a
//!   parser.
//!
//! [`process_chunk`]: AssistantMessageParser::process_chunk

pub mod blocks;
pub mod cli;
pub mod config;
pub mod constants;
pub mod native;
pub mod output;
pub mod parser;
pub mod registry;
pub mod stream;

pub use blocks::{ContentBlock, ParamMap, TextBlock, ToolUseBlock};
pub use native::{NativeEvent, NativeStreamParser};
pub use parser::AssistantMessageParser;
pub use registry::{TagRegistry, ToolSchema};
pub use stream::drive_stream;
