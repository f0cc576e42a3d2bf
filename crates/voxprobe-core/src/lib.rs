//! # Voxprobe Core
//!
//! Detection engine for on-disk speech model packs.
//!
//! ## Features
//!
//! - Bounded, deterministic indexing of a model directory
//! - Speech-to-text classification over seventeen architectures
//! - Text-to-speech classification over six architectures
//! - Word-boundary directory name hints (`t-one` is a hint, `cantonese` is not)
//! - Resolved file paths ready to hand to an inference runtime
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voxprobe_core::{detect_stt_model, SttDetectOptions};
//!
//! let result = detect_stt_model(
//!     Path::new("/models/sherpa-onnx-zipformer-en"),
//!     &SttDetectOptions::new().with_prefer_int8(true),
//! );
//! if result.ok {
//!     println!("{} -> {:?}", result.selected_kind, result.resolved_paths.get("encoder"));
//! } else {
//!     eprintln!("{}", result.error_message().unwrap_or_default());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use classifier::{detect_stt_model, detect_tts_model, ModelClassifier, SttClassifier, TtsClassifier};
pub use config::{DetectConfig, SttDetectOptions, TtsDetectOptions};
pub use error::{VoxprobeError, VoxprobeResult};
pub use model::{
    contains_word, index_files, DetectResult, DetectionCandidate, FileEntry, FileIndex,
    FileIndexer, ModelKind, ResolvedPaths, SttModelKind, TtsModelKind, MAX_SCAN_DEPTH,
};

/// Version information for the voxprobe-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
