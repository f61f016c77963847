//! Low-level tag scanning for the incremental parser.
//!
//! These helpers are pure functions over the cumulative buffer; the parser
//! owns the cursor and decides what to do with each classification. Tag
//! syntax is deliberately narrow: `<name>` / `</name>` with no attributes
//! and no whitespace, where a name is one or more of `[A-Za-z0-9_-]`.
//! Anything else at a `<` is literal text.

use crate::constants::MAX_TAG_NAME_LEN;

/// Classification of the bytes starting at a `<` in the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum TagScan<'a> {
    /// A complete opening tag `<name>`; `end` is the buffer offset just
    /// past the `>`.
    Opening { name: &'a str, end: usize },
    /// A complete closing tag `</name>`; `end` is just past the `>`.
    Closing { name: &'a str, end: usize },
    /// The buffer ends mid-tag and what has arrived so far could still
    /// become a valid tag. The caller should park and wait for more input.
    NeedMore,
    /// Cannot be a tag (bad name character, empty name, or over-long
    /// name). The `<` is literal text.
    NotATag,
}

/// Whether `c` may appear in a tag name.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Classifies a potential tag at byte offset `lt` (which must point at `<`).
///
/// The result depends only on the buffer contents from `lt` onward, never
/// on how the stream was chunked, which is what makes the parse
/// chunk-boundary invariant: an undecidable prefix yields [`TagScan::NeedMore`]
/// and the caller re-classifies from the same offset once more text arrives.
pub fn scan_tag(buffer: &str, lt: usize) -> TagScan<'_> {
    debug_assert_eq!(&buffer[lt..lt + 1], "<");
    let rest = &buffer[lt + 1..];

    let (closing, name_area) = match rest.strip_prefix('/') {
        Some(after_slash) => (true, after_slash),
        None => (false, rest),
    };

    let mut name_len = 0;
    for (i, c) in name_area.char_indices() {
        if c == '>' {
            if i == 0 {
                return TagScan::NotATag;
            }
            let name = &name_area[..i];
            let end = lt + 1 + (if closing { 1 } else { 0 }) + i + 1;
            return if closing {
                TagScan::Closing { name, end }
            } else {
                TagScan::Opening { name, end }
            };
        }
        if !is_name_char(c) {
            return TagScan::NotATag;
        }
        name_len += 1;
        if name_len > MAX_TAG_NAME_LEN {
            return TagScan::NotATag;
        }
    }

    // Ran off the end of the buffer while everything still looked tag-like.
    TagScan::NeedMore
}

/// Returns how many trailing bytes of `tail` must be withheld because they
/// form a proper prefix of `closer`.
///
/// Used when accumulating a value that ends at a literal closing tag: any
/// suffix of the unconsumed tail that could be the start of the closer is
/// left unconsumed, so the closer can never be half-committed into the
/// value across a chunk boundary. A complete occurrence of `closer` inside
/// `tail` is the caller's concern (a plain `find` before calling this).
pub fn holdback(tail: &str, closer: &str) -> usize {
    let max = closer.len().saturating_sub(1).min(tail.len());
    for k in (1..=max).rev() {
        if !tail.is_char_boundary(tail.len() - k) {
            continue;
        }
        if tail.ends_with(&closer[..k]) {
            return k;
        }
    }
    0
}
