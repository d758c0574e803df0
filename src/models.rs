//! Core data types flowing through the suggestion pipeline.
//!
//! The persistence layer owns the full document and unit records; this core
//! only reads the fields below. A [`SuggestionResult`] is the streaming
//! record emitted after each processed chunk and is part of the public
//! contract consumed by the transport layer (SSE or a collapsed JSON reply).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum number of unit ids reported in any single result.
pub const MAX_SUGGESTIONS: usize = 5;

/// Message used when a request terminates with an empty suggestion set.
pub const NO_MATCH_MESSAGE: &str = "no matching unit";

/// The slice of a stored document this core reads: display name and the
/// path of the uploaded file on disk.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub name: String,
    pub filepath: PathBuf,
}

impl DocumentRef {
    pub fn new(name: impl Into<String>, filepath: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            filepath: filepath.into(),
        }
    }
}

/// A candidate recipient unit (e.g. an organizational department).
///
/// Units arrive as an ordered list; the position in that list is the index
/// vocabulary the model answers with, so the order must not change for the
/// duration of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// Incremental result record, one per processed chunk.
///
/// Invariants: `suggested_ids` holds at most [`MAX_SUGGESTIONS`] ids with no
/// duplicates, in first-seen order. `chunk_index` is 1-based for chunk
/// records; `0` is reserved for pre-chunking records (empty unit list,
/// fallback). After a record with `is_final = true` no further records are
/// produced for the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub suggested_ids: Vec<String>,
    pub has_suggestions: bool,
    pub message: String,
    pub is_fallback: bool,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub is_final: bool,
}

impl SuggestionResult {
    /// Terminal "no suggestions" record (empty unit list, or an empty
    /// accumulated set at the end of processing).
    pub fn none(chunk_index: usize, total_chunks: usize, is_fallback: bool) -> Self {
        Self {
            suggested_ids: Vec::new(),
            has_suggestions: false,
            message: NO_MATCH_MESSAGE.to_string(),
            is_fallback,
            chunk_index,
            total_chunks,
            is_final: true,
        }
    }
}
