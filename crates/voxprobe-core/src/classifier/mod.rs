//! Model directory classifiers
//!
//! Both classifiers run the same pipeline: validate the input path, index the
//! directory once, probe for every structural part, fold the probes into a
//! layout, list the candidates, then select a kind either by validating the
//! caller's explicit request or by walking a fixed priority table.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VoxprobeError;
use crate::model::{
    DetectResult, DetectionCandidate, FileIndex, FileIndexer, KindRequest, ModelKind,
};

/// Speech-to-text classifier
pub mod stt;
/// Text-to-speech classifier
pub mod tts;

pub use stt::SttClassifier;
pub use tts::TtsClassifier;

/// A classifier for one direction of speech models
pub trait ModelClassifier {
    /// Kind catalogue the classifier selects from
    type Kind: ModelKind;
    /// Caller options
    type Options;

    /// Classify `dir` and resolve the files of the selected kind.
    ///
    /// Never panics and never returns `Err`: every failure is carried in the
    /// result with `selected_kind` set to `unknown`.
    fn detect(&self, dir: &Path, options: &Self::Options) -> DetectResult<Self::Kind>;
}

/// One entry of an auto-selection priority table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Priority<K> {
    /// Selected whenever the kind is satisfied
    Always(K),
    /// Selected only when the kind is satisfied and its name hint is present
    Hinted(K),
}

/// Structural probe results folded into per-kind answers
pub(crate) trait Layout<K: ModelKind> {
    /// Whether auto detection accepts `kind` (structure plus name hints)
    fn satisfies(&self, kind: K) -> bool;

    /// Whether the directory name carries the kind's own hint
    fn hinted(&self, kind: K) -> bool;

    /// Structural parts of `kind` that were not found, ignoring name hints
    fn missing_parts(&self, kind: K) -> Vec<&'static str>;

    /// Directory holding the kind's primary file
    fn primary_directory(&self, kind: K) -> Option<PathBuf>;
}

/// Reject bad input paths, then index the directory under its canonical path.
/// Classification works on the returned root only.
pub(crate) fn open_directory(dir: &Path) -> Result<(PathBuf, FileIndex), VoxprobeError> {
    if dir.as_os_str().is_empty() {
        return Err(VoxprobeError::EmptyPath);
    }
    if !dir.exists() {
        return Err(VoxprobeError::directory_not_found(dir));
    }
    if !dir.is_dir() {
        return Err(VoxprobeError::not_a_directory(dir));
    }
    let root = fs::canonicalize(dir)
        .map_err(|e| VoxprobeError::io(format!("Failed to resolve {}: {e}", dir.display())))?;
    let index = FileIndexer::new().scan(&root);
    if index.is_empty() {
        return Err(VoxprobeError::empty_directory(&root));
    }
    Ok((root, index))
}

/// Lowercased name of the model directory itself; parent folders never hint
pub(crate) fn hint_text(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Every satisfied kind, in catalogue order
pub(crate) fn collect_candidates<K, L>(layout: &L, dir: &Path) -> Vec<DetectionCandidate<K>>
where
    K: ModelKind,
    L: Layout<K>,
{
    K::all()
        .iter()
        .copied()
        .filter(|kind| layout.satisfies(*kind))
        .map(|kind| DetectionCandidate {
            kind,
            directory: layout
                .primary_directory(kind)
                .unwrap_or_else(|| dir.to_path_buf()),
        })
        .collect()
}

/// Resolve the caller's request to a kind, or the error that ends detection
pub(crate) fn select_kind<K, L>(
    request: KindRequest<K>,
    layout: &L,
    priority: &[Priority<K>],
    dir: &Path,
) -> Result<K, VoxprobeError>
where
    K: ModelKind,
    L: Layout<K>,
{
    match request {
        KindRequest::Explicit(kind) => {
            let missing = layout.missing_parts(kind);
            if missing.is_empty() {
                Ok(kind)
            } else {
                Err(VoxprobeError::structural_mismatch(
                    kind.as_str(),
                    missing.into_iter().map(String::from).collect(),
                    dir,
                ))
            }
        }
        KindRequest::Auto => priority
            .iter()
            .find_map(|entry| match *entry {
                Priority::Always(kind) if layout.satisfies(kind) => Some(kind),
                Priority::Hinted(kind) if layout.satisfies(kind) && layout.hinted(kind) => {
                    Some(kind)
                }
                _ => None,
            })
            .ok_or_else(|| VoxprobeError::no_candidate(dir)),
    }
}

/// Speech-to-text detection with the default classifier
pub fn detect_stt_model(
    dir: &Path,
    options: &crate::config::SttDetectOptions,
) -> DetectResult<crate::model::SttModelKind> {
    SttClassifier::new().detect(dir, options)
}

/// Text-to-speech detection with the default classifier
pub fn detect_tts_model(
    dir: &Path,
    options: &crate::config::TtsDetectOptions,
) -> DetectResult<crate::model::TtsModelKind> {
    TtsClassifier::new().detect(dir, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SttModelKind;
    use tempfile::TempDir;

    struct FixedLayout {
        satisfied: Vec<SttModelKind>,
        hinted: Vec<SttModelKind>,
    }

    impl Layout<SttModelKind> for FixedLayout {
        fn satisfies(&self, kind: SttModelKind) -> bool {
            self.satisfied.contains(&kind)
        }

        fn hinted(&self, kind: SttModelKind) -> bool {
            self.hinted.contains(&kind)
        }

        fn missing_parts(&self, kind: SttModelKind) -> Vec<&'static str> {
            if self.satisfied.contains(&kind) {
                Vec::new()
            } else {
                vec!["model"]
            }
        }

        fn primary_directory(&self, _kind: SttModelKind) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_open_directory_input_errors() {
        assert_eq!(open_directory(Path::new("")).unwrap_err(), VoxprobeError::EmptyPath);

        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            open_directory(&missing).unwrap_err(),
            VoxprobeError::DirectoryNotFound { .. }
        ));

        let file = temp_dir.path().join("model.onnx");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            open_directory(&file).unwrap_err(),
            VoxprobeError::NotADirectory { .. }
        ));

        let empty = temp_dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();
        assert!(matches!(
            open_directory(&empty).unwrap_err(),
            VoxprobeError::EmptyDirectory { .. }
        ));
    }

    #[test]
    fn test_open_directory_resolves_non_canonical_spellings() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("sherpa-onnx-t-one-ru");
        std::fs::create_dir_all(dir.join("exp")).unwrap();
        std::fs::write(dir.join("model.onnx"), b"x").unwrap();

        let (root, index) = open_directory(&dir.join("exp").join("..")).unwrap();
        assert_eq!(root, std::fs::canonicalize(&dir).unwrap());
        assert_eq!(index.files.len(), 1);
        assert_eq!(hint_text(&root), "sherpa-onnx-t-one-ru");
    }

    #[test]
    fn test_hint_text_ignores_parent_folders() {
        let dir = Path::new("/data/com.example.tone.app/files/Sherpa-Onnx-Paraformer-ZH");
        assert_eq!(hint_text(dir), "sherpa-onnx-paraformer-zh");
    }

    #[test]
    fn test_hinted_priority_entries_need_the_hint() {
        let layout = FixedLayout {
            satisfied: vec![SttModelKind::FunAsrNano, SttModelKind::Paraformer],
            hinted: vec![],
        };
        let table = [
            Priority::Hinted(SttModelKind::FunAsrNano),
            Priority::Always(SttModelKind::Paraformer),
            Priority::Always(SttModelKind::FunAsrNano),
        ];
        let dir = Path::new("/m");
        assert_eq!(
            select_kind(KindRequest::Auto, &layout, &table, dir),
            Ok(SttModelKind::Paraformer)
        );

        let layout = FixedLayout {
            hinted: vec![SttModelKind::FunAsrNano],
            ..layout
        };
        assert_eq!(
            select_kind(KindRequest::Auto, &layout, &table, dir),
            Ok(SttModelKind::FunAsrNano)
        );
    }

    #[test]
    fn test_explicit_request_reports_missing_parts() {
        let layout = FixedLayout {
            satisfied: vec![],
            hinted: vec![],
        };
        let err = select_kind(
            KindRequest::Explicit(SttModelKind::Dolphin),
            &layout,
            &[],
            Path::new("/m"),
        )
        .unwrap_err();
        assert_eq!(
            err,
            VoxprobeError::structural_mismatch("dolphin", vec!["model".to_string()], Path::new("/m"))
        );
    }

    #[test]
    fn test_candidates_default_to_scan_root() {
        let layout = FixedLayout {
            satisfied: vec![SttModelKind::Whisper, SttModelKind::Canary],
            hinted: vec![],
        };
        let candidates = collect_candidates(&layout, Path::new("/m"));
        let kinds: Vec<_> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![SttModelKind::Whisper, SttModelKind::Canary]);
        assert!(candidates.iter().all(|c| c.directory == Path::new("/m")));
    }
}
