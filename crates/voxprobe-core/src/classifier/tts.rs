//! Text-to-speech model detection.

use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use super::{
    collect_candidates, hint_text, open_directory, select_kind, Layout, ModelClassifier, Priority,
};
use crate::config::TtsDetectOptions;
use crate::error::VoxprobeError;
use crate::model::{
    contains_word, find_by_any_token, find_by_exact_name, find_by_name_or_suffix,
    find_by_prefix_and_suffix, find_largest_excluding, DetectResult, DirEntry, FileEntry,
    FileIndex, KindRequest, ModelKind, ResolvedPaths, TtsModelKind,
};

const MODEL_STOPLIST: &[&str] = &[
    "encoder",
    "decoder",
    "joiner",
    "vocoder",
    "vocos",
    "hifigan",
    "acoustic",
    "embedding",
    "llm",
    "encoder_adaptor",
];

/// Directory that holds the phonemizer data
const ESPEAK_DATA_DIR: &str = "espeak-ng-data";
const DICT_DIR: &str = "dict";

pub(crate) const AUTO_PRIORITY: &[Priority<TtsModelKind>] = &[
    Priority::Always(TtsModelKind::Pocket),
    Priority::Always(TtsModelKind::ZipVoice),
    Priority::Always(TtsModelKind::Matcha),
    Priority::Always(TtsModelKind::Kokoro),
    Priority::Always(TtsModelKind::Kitten),
    Priority::Always(TtsModelKind::Vits),
];

#[derive(Debug, Clone, Default)]
struct TtsProbes {
    model: Option<FileEntry>,
    acoustic: Option<FileEntry>,
    vocoder: Option<FileEntry>,
    voices: Option<FileEntry>,
    encoder: Option<FileEntry>,
    decoder: Option<FileEntry>,
    lm_flow: Option<FileEntry>,
    lm_main: Option<FileEntry>,
    text_conditioner: Option<FileEntry>,
    vocab_json: Option<FileEntry>,
    token_scores_json: Option<FileEntry>,
    tokens: Option<FileEntry>,
    lexicon: Option<FileEntry>,
    espeak_data: Option<DirEntry>,
    dict_dir: Option<DirEntry>,
}

impl TtsProbes {
    fn run(index: &FileIndex) -> Self {
        let files = &index.files;
        let model = find_by_any_token(files, &["model"], None)
            .or_else(|| find_largest_excluding(files, MODEL_STOPLIST));

        Self {
            model: model.cloned(),
            acoustic: find_by_any_token(files, &["acoustic", "model-steps"], None).cloned(),
            vocoder: find_by_any_token(files, &["vocoder", "vocos", "hifigan"], None).cloned(),
            voices: find_by_name_or_suffix(files, "voices.bin").cloned(),
            encoder: find_by_any_token(files, &["encoder"], None).cloned(),
            decoder: find_by_any_token(files, &["decoder"], None).cloned(),
            lm_flow: find_by_any_token(files, &["lm_flow"], None).cloned(),
            lm_main: find_by_any_token(files, &["lm_main"], None).cloned(),
            text_conditioner: find_by_any_token(files, &["text_conditioner"], None).cloned(),
            vocab_json: find_by_exact_name(files, "vocab.json").cloned(),
            token_scores_json: find_by_exact_name(files, "token_scores.json").cloned(),
            tokens: find_by_name_or_suffix(files, "tokens.txt").cloned(),
            lexicon: find_by_name_or_suffix(files, "lexicon.txt")
                .or_else(|| find_by_prefix_and_suffix(files, "lexicon", ".txt"))
                .cloned(),
            espeak_data: index.find_directory(ESPEAK_DATA_DIR).cloned(),
            dict_dir: index.find_directory(DICT_DIR).cloned(),
        }
    }
}

#[derive(Debug, Clone)]
struct TtsLayout {
    probes: TtsProbes,
    kokoro_hint: bool,
    kitten_hint: bool,
    matcha: bool,
    zipvoice: bool,
    pocket: bool,
    voices_model: bool,
    single_model: bool,
}

impl TtsLayout {
    fn new(probes: TtsProbes, dir: &Path) -> Self {
        let text = hint_text(dir);
        let matcha = probes.acoustic.is_some() && probes.vocoder.is_some();
        let zipvoice =
            probes.encoder.is_some() && probes.decoder.is_some() && probes.vocoder.is_some();
        let pocket = probes.lm_flow.is_some()
            && probes.lm_main.is_some()
            && probes.encoder.is_some()
            && probes.decoder.is_some()
            && probes.text_conditioner.is_some()
            && probes.vocab_json.is_some()
            && probes.token_scores_json.is_some();
        let voices_model = probes.voices.is_some() && probes.model.is_some();
        let single_model = probes.model.is_some() && !(matcha || zipvoice || pocket);

        Self {
            kokoro_hint: contains_word(&text, "kokoro"),
            kitten_hint: contains_word(&text, "kitten"),
            probes,
            matcha,
            zipvoice,
            pocket,
            voices_model,
            single_model,
        }
    }

    fn resolve(&self, kind: TtsModelKind) -> ResolvedPaths {
        let p = &self.probes;
        let path = |entry: &Option<FileEntry>| entry.as_ref().map(|f| f.path.clone());
        let mut paths = ResolvedPaths::new();

        match kind {
            TtsModelKind::Vits => {
                paths.insert_opt("model", path(&p.model));
            }
            TtsModelKind::Matcha => {
                paths.insert_opt("acousticModel", path(&p.acoustic));
                paths.insert_opt("vocoder", path(&p.vocoder));
            }
            TtsModelKind::Kokoro | TtsModelKind::Kitten => {
                paths.insert_opt("model", path(&p.model));
                paths.insert_opt("voices", path(&p.voices));
            }
            TtsModelKind::ZipVoice => {
                paths.insert_opt("encoder", path(&p.encoder));
                paths.insert_opt("decoder", path(&p.decoder));
                paths.insert_opt("vocoder", path(&p.vocoder));
            }
            TtsModelKind::Pocket => {
                paths.insert_opt("lmFlow", path(&p.lm_flow));
                paths.insert_opt("lmMain", path(&p.lm_main));
                paths.insert_opt("encoder", path(&p.encoder));
                paths.insert_opt("decoder", path(&p.decoder));
                paths.insert_opt("textConditioner", path(&p.text_conditioner));
                paths.insert_opt("vocabJson", path(&p.vocab_json));
                paths.insert_opt("tokenScoresJson", path(&p.token_scores_json));
            }
            TtsModelKind::Unknown => {}
        }

        if kind != TtsModelKind::Pocket {
            paths.insert_opt("lexicon", path(&p.lexicon));
            paths.insert_opt("dictDir", p.dict_dir.as_ref().map(|d| d.path.clone()));
        }
        paths
    }
}

impl Layout<TtsModelKind> for TtsLayout {
    fn satisfies(&self, kind: TtsModelKind) -> bool {
        match kind {
            TtsModelKind::Vits => self.single_model && self.probes.voices.is_none(),
            TtsModelKind::Matcha => self.matcha,
            TtsModelKind::Kokoro => self.voices_model && !(self.kitten_hint && !self.kokoro_hint),
            TtsModelKind::Kitten => self.voices_model && !(self.kokoro_hint && !self.kitten_hint),
            TtsModelKind::ZipVoice => self.zipvoice,
            TtsModelKind::Pocket => self.pocket,
            TtsModelKind::Unknown => false,
        }
    }

    fn hinted(&self, kind: TtsModelKind) -> bool {
        match kind {
            TtsModelKind::Kokoro => self.kokoro_hint,
            TtsModelKind::Kitten => self.kitten_hint,
            _ => false,
        }
    }

    fn missing_parts(&self, kind: TtsModelKind) -> Vec<&'static str> {
        let p = &self.probes;
        let parts: Vec<(&'static str, bool)> = match kind {
            TtsModelKind::Vits => vec![("model", self.single_model)],
            TtsModelKind::Matcha => vec![
                ("acoustic_model", p.acoustic.is_some()),
                ("vocoder", p.vocoder.is_some()),
            ],
            TtsModelKind::Kokoro | TtsModelKind::Kitten => vec![
                ("model", p.model.is_some()),
                ("voices.bin", p.voices.is_some()),
            ],
            TtsModelKind::ZipVoice => vec![
                ("encoder", p.encoder.is_some()),
                ("decoder", p.decoder.is_some()),
                ("vocoder", p.vocoder.is_some()),
            ],
            TtsModelKind::Pocket => vec![
                ("lm_flow", p.lm_flow.is_some()),
                ("lm_main", p.lm_main.is_some()),
                ("encoder", p.encoder.is_some()),
                ("decoder", p.decoder.is_some()),
                ("text_conditioner", p.text_conditioner.is_some()),
                ("vocab.json", p.vocab_json.is_some()),
                ("token_scores.json", p.token_scores_json.is_some()),
            ],
            TtsModelKind::Unknown => vec![("model", false)],
        };
        parts
            .into_iter()
            .filter(|(_, found)| !found)
            .map(|(name, _)| name)
            .collect()
    }

    fn primary_directory(&self, kind: TtsModelKind) -> Option<PathBuf> {
        let p = &self.probes;
        let primary = match kind {
            TtsModelKind::Vits | TtsModelKind::Kokoro | TtsModelKind::Kitten => p.model.as_ref(),
            TtsModelKind::Matcha => p.acoustic.as_ref(),
            TtsModelKind::ZipVoice => p.encoder.as_ref(),
            TtsModelKind::Pocket => p.lm_main.as_ref(),
            TtsModelKind::Unknown => None,
        };
        primary.map(|f| f.directory().to_path_buf())
    }
}

/// Classifier for text-to-speech model directories
#[derive(Debug, Clone, Copy, Default)]
pub struct TtsClassifier;

impl TtsClassifier {
    /// Create a classifier
    pub fn new() -> Self {
        Self
    }
}

impl ModelClassifier for TtsClassifier {
    type Kind = TtsModelKind;
    type Options = TtsDetectOptions;

    fn detect(&self, dir: &Path, options: &TtsDetectOptions) -> DetectResult<TtsModelKind> {
        let _span = info_span!("detect_tts", dir = %dir.display()).entered();

        let (root, index) = match open_directory(dir) {
            Ok(opened) => opened,
            Err(e) => {
                warn!("TTS detection failed: {}", e);
                return DetectResult::failure(Vec::new(), e, None);
            }
        };

        let dir = root.as_path();

        let request = match KindRequest::<TtsModelKind>::parse(options.model_type.as_deref()) {
            Ok(request) => request,
            Err(name) => {
                let e = VoxprobeError::unknown_kind(name, dir);
                warn!("TTS detection failed: {}", e);
                return DetectResult::failure(Vec::new(), e, None);
            }
        };

        let layout = TtsLayout::new(TtsProbes::run(&index), dir);
        if options.debug {
            info!("TTS probes for {:?}: {:#?}", dir, layout.probes);
            info!(
                "TTS layout: matcha={} zipvoice={} pocket={} voices_model={} single_model={} kokoro_hint={} kitten_hint={}",
                layout.matcha,
                layout.zipvoice,
                layout.pocket,
                layout.voices_model,
                layout.single_model,
                layout.kokoro_hint,
                layout.kitten_hint
            );
        }

        let candidates = collect_candidates(&layout, dir);
        debug!(
            "TTS candidates: {:?}",
            candidates.iter().map(|c| c.kind.as_str()).collect::<Vec<_>>()
        );

        let kind = match select_kind(request, &layout, AUTO_PRIORITY, dir) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("TTS detection failed: {}", e);
                return DetectResult::failure(candidates, e, None);
            }
        };
        debug!("Selected TTS model kind: {}", kind);

        let mut paths = layout.resolve(kind);
        if kind.requires_tokens() {
            let Some(tokens) = &layout.probes.tokens else {
                let e = VoxprobeError::missing_tokens(dir);
                warn!("TTS detection failed: {}", e);
                return DetectResult::failure(candidates, e, None);
            };
            paths.insert("tokens", tokens.path.clone());

            let Some(espeak) = &layout.probes.espeak_data else {
                let e = VoxprobeError::missing_espeak_data(dir);
                warn!("TTS detection failed: {}", e);
                return DetectResult::failure(candidates, e, None);
            };
            paths.insert("dataDir", espeak.path.clone());
        }

        let vanished = paths.missing_on_disk();
        if !vanished.is_empty() {
            let e = VoxprobeError::structural_mismatch(kind.as_str(), vanished, dir);
            warn!("TTS detection failed: {}", e);
            return DetectResult::failure(candidates, e, None);
        }

        DetectResult::success(candidates, kind, paths, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_for(dir: &str, names: &[&str]) -> TtsLayout {
        let root = PathBuf::from(dir);
        let index = FileIndex {
            files: names
                .iter()
                .map(|n| FileEntry::new(root.join(n), 10))
                .collect(),
            directories: Vec::new(),
        };
        TtsLayout::new(TtsProbes::run(&index), &root)
    }

    fn candidates(layout: &TtsLayout) -> Vec<TtsModelKind> {
        collect_candidates(layout, Path::new("/m"))
            .into_iter()
            .map(|c| c.kind)
            .collect()
    }

    #[test]
    fn test_voices_without_hint_offers_both() {
        let layout = layout_for("/m/voices-pack", &["model.onnx", "voices.bin"]);
        assert_eq!(candidates(&layout), vec![TtsModelKind::Kokoro, TtsModelKind::Kitten]);
        assert!(!layout.satisfies(TtsModelKind::Vits));
    }

    #[test]
    fn test_kitten_hint_excludes_kokoro() {
        let layout = layout_for("/m/kitten-nano-en-v0_1", &["model.fp16.onnx", "voices.bin"]);
        assert_eq!(candidates(&layout), vec![TtsModelKind::Kitten]);
    }

    #[test]
    fn test_matcha_names() {
        let layout = layout_for(
            "/m/matcha-icefall-en_US-ljspeech",
            &["model-steps-3.onnx", "vocos-22khz-univ.onnx"],
        );
        assert!(layout.matcha);
        assert!(!layout.single_model);
        assert_eq!(candidates(&layout), vec![TtsModelKind::Matcha]);
    }

    #[test]
    fn test_pocket_bundle_is_not_zipvoice() {
        let layout = layout_for(
            "/m/pocket",
            &[
                "lm_flow.onnx",
                "lm_main.onnx",
                "encoder.onnx",
                "decoder.onnx",
                "text_conditioner.onnx",
                "vocab.json",
                "token_scores.json",
            ],
        );
        assert!(layout.pocket);
        assert!(!layout.zipvoice);
        assert_eq!(candidates(&layout), vec![TtsModelKind::Pocket]);
    }

    #[test]
    fn test_pocket_missing_parts() {
        let layout = layout_for("/m/pocket", &["lm_flow.onnx", "lm_main.onnx"]);
        let missing = layout.missing_parts(TtsModelKind::Pocket);
        assert_eq!(
            missing,
            vec!["encoder", "decoder", "text_conditioner", "vocab.json", "token_scores.json"]
        );
    }

    #[test]
    fn test_every_kind_in_priority_table() {
        for kind in TtsModelKind::ALL {
            assert!(AUTO_PRIORITY.contains(&Priority::Always(*kind)));
        }
    }
}
