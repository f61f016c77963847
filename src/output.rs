//! Output rendering for parsed block sequences.
//!
//! Defines the [`BlockRenderer`] trait that decouples the parser from the
//! display layer. [`StdoutRenderer`] prints incrementally to the terminal
//! as blocks grow (the familiar "typing" effect, plus a header line per
//! tool invocation); [`JsonRenderer`] stays silent until the end and emits
//! the final sequence as pretty-printed JSON for machine consumption.

use colored::Colorize;
use std::io::{self, Write};

use crate::blocks::ContentBlock;

/// Trait for rendering an evolving block sequence.
///
/// `render_update` is called after every chunk with the full sequence so
/// far; implementations track their own progress per block. `render_done`
/// is called exactly once, after the parser has finalized.
pub trait BlockRenderer {
    /// Render whatever is new since the previous update.
    fn render_update(&mut self, blocks: &[ContentBlock]);

    /// Called when the stream is complete and all blocks are final.
    fn render_done(&mut self, blocks: &[ContentBlock]);
}

/// Per-block rendering progress for [`StdoutRenderer`].
enum Progress {
    /// Bytes of the text block's content already printed.
    Text(usize),
    /// Whether the tool's completion summary has been printed (the header
    /// prints when the entry is created).
    Tool { summarized: bool },
}

/// Renders parsed blocks directly to stdout as they arrive.
///
/// Text is printed token-by-token with an explicit flush. A tool block
/// prints a colored header as soon as its opening tag is recognized and a
/// parameter summary once the block completes, mirroring how the
/// surrounding application announces tool invocations.
pub struct StdoutRenderer {
    progress: Vec<Progress>,
}

impl StdoutRenderer {
    pub fn new() -> Self {
        Self {
            progress: Vec::new(),
        }
    }

    fn render_block(&mut self, idx: usize, block: &ContentBlock) {
        if self.progress.len() == idx {
            self.progress.push(match block {
                ContentBlock::Text(_) => Progress::Text(0),
                ContentBlock::ToolUse(t) => {
                    println!();
                    println!("{} {}", "tool".cyan().bold(), t.name.cyan());
                    Progress::Tool { summarized: false }
                }
            });
        }

        match (&mut self.progress[idx], block) {
            (Progress::Text(printed), ContentBlock::Text(t)) => {
                if *printed < t.content.len() {
                    print!("{}", &t.content[*printed..]);
                    let _ = io::stdout().flush();
                    *printed = t.content.len();
                }
            }
            (Progress::Tool { summarized }, ContentBlock::ToolUse(t)) => {
                if !t.partial && !*summarized {
                    for (name, value) in t.params.iter() {
                        println!("  {} {}", format!("{name}:").dimmed(), preview(value));
                    }
                    if let Some(body) = t.raw_body.as_deref() {
                        println!("  {} {}", "payload:".dimmed(), preview(body));
                    }
                    *summarized = true;
                }
            }
            // A block never changes kind once created.
            _ => {}
        }
    }
}

impl Default for StdoutRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRenderer for StdoutRenderer {
    fn render_update(&mut self, blocks: &[ContentBlock]) {
        for (idx, block) in blocks.iter().enumerate() {
            self.render_block(idx, block);
        }
    }

    fn render_done(&mut self, blocks: &[ContentBlock]) {
        self.render_update(blocks);
        println!();
        let tools = blocks.iter().filter(|b| b.as_tool_use().is_some()).count();
        println!(
            "{}",
            format!("{} block(s), {} tool invocation(s)", blocks.len(), tools).dimmed()
        );
    }
}

/// Renders nothing until the end, then emits the block sequence as JSON.
pub struct JsonRenderer;

impl BlockRenderer for JsonRenderer {
    fn render_update(&mut self, _blocks: &[ContentBlock]) {}

    fn render_done(&mut self, blocks: &[ContentBlock]) {
        match serde_json::to_string_pretty(blocks) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("error: failed to serialize blocks: {err}"),
        }
    }
}

/// First line of a value, truncated for one-line display.
fn preview(value: &str) -> String {
    const MAX: usize = 80;
    let line = value.trim_end().lines().next().unwrap_or("").to_string();
    let mut out: String = line.chars().take(MAX).collect();
    if line.chars().count() > MAX || value.trim_end().lines().count() > 1 {
        out.push('…');
    }
    out
}
