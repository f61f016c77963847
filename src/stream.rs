//! Async adapter between a chunk stream and the parser.
//!
//! The surrounding agent loop usually has the assistant response as a
//! [`futures::Stream`] of text fragments (one per delta event).
//! [`drive_stream`] folds such a stream through an
//! [`AssistantMessageParser`], invoking a callback with the updated block
//! slice after every fragment and finalizing once the stream ends. The
//! parser itself stays synchronous and single-threaded; this is just the
//! seam where it meets the event loop.

use futures::{Stream, StreamExt};

use crate::blocks::ContentBlock;
use crate::parser::AssistantMessageParser;

/// Drives `chunks` through `parser` to completion.
///
/// `on_update` is called once per chunk with the full block sequence so
/// far (same contract as [`AssistantMessageParser::process_chunk`]), and a
/// final time after [`finalize_blocks`] closes any trailing partial block.
/// Cancellation is the caller's concern: dropping the stream early and
/// calling this again is not supported — abort by finalizing the parser
/// directly instead.
///
/// [`finalize_blocks`]: AssistantMessageParser::finalize_blocks
pub async fn drive_stream<S, F>(mut chunks: S, parser: &mut AssistantMessageParser, mut on_update: F)
where
    S: Stream<Item = String> + Unpin,
    F: FnMut(&[ContentBlock]),
{
    while let Some(chunk) = chunks.next().await {
        on_update(parser.process_chunk(&chunk));
    }
    parser.finalize_blocks();
    on_update(parser.blocks());
}
