//! Model directory scanning
//! File indexing, name matching and the shared detection types

/// Bounded directory indexing
pub mod discovery;
/// File name and word-boundary matchers
pub mod matcher;
/// Model kinds and detection results
pub mod types;

pub use discovery::{index_files, DirEntry, FileIndex, FileIndexer, MAX_SCAN_DEPTH};
pub use matcher::{
    contains_any_word, contains_word, find_by_any_token, find_by_exact_name,
    find_by_name_or_suffix, find_by_prefix_and_suffix, find_by_suffix,
    find_largest_excluding,
};
pub use types::{
    DetectResult, DetectionCandidate, FileEntry, KindRequest, ModelKind, ResolvedPaths,
    SttModelKind, TtsModelKind,
};
