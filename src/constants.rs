//! Centralized constants for nami.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "nami";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "nami.toml";

/// Hard cap on tag name length.
///
/// A `<` followed by more name characters than this is committed to the
/// surrounding text instead of being held back as a possible tag, so an
/// unterminated `<aaaa...` run cannot stall the parser indefinitely.
pub const MAX_TAG_NAME_LEN: usize = 128;

// --- Replay defaults ---

/// Default chunk size (in bytes, split at UTF-8 boundaries) for `nami replay`.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Default delay between replayed chunks, in milliseconds.
pub const DEFAULT_REPLAY_DELAY_MS: u64 = 0;
