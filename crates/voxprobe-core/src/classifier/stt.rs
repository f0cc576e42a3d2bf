//! Speech-to-text model detection.
//!
//! Probes for the transducer triple, the encoder/decoder pair, a single
//! generic model file, the FunASR-Nano and Moonshine bundles and the tokens
//! file, then classifies with [`SttLayout`] and the [`AUTO_PRIORITY`] table.

use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use super::{
    collect_candidates, hint_text, open_directory, select_kind, Layout, ModelClassifier, Priority,
};
use crate::config::SttDetectOptions;
use crate::error::VoxprobeError;
use crate::model::matcher::without_tokens;
use crate::model::{
    contains_any_word, find_by_any_token, find_by_name_or_suffix, find_largest_excluding,
    DetectResult, FileEntry, FileIndex, KindRequest, ModelKind, ResolvedPaths, SttModelKind,
};

/// Names that rule a file out as "the one big model file"
const MODEL_STOPLIST: &[&str] = &[
    "encoder",
    "decoder",
    "joiner",
    "vocoder",
    "acoustic",
    "embedding",
    "llm",
    "encoder_adaptor",
];

const NEMO_HINTS: &[&str] = &["nemo", "parakeet"];
const NEMO_TRANSDUCER_HINTS: &[&str] = &["nemo", "parakeet", "tdt"];
const WENET_HINTS: &[&str] = &["wenet"];
const SENSE_VOICE_HINTS: &[&str] = &["sense", "sensevoice"];
const ZIPFORMER_HINTS: &[&str] = &["zipformer"];
const CANARY_HINTS: &[&str] = &["canary"];
const FIRE_RED_HINTS: &[&str] = &["firered", "fire-red", "fire_red", "fireredasr"];
const FUNASR_HINTS: &[&str] = &["funasr", "fun-asr", "fun_asr"];
const MOONSHINE_HINTS: &[&str] = &["moonshine"];
const DOLPHIN_HINTS: &[&str] = &["dolphin"];
const OMNILINGUAL_HINTS: &[&str] = &["omnilingual"];
const MEDASR_HINTS: &[&str] = &["medasr", "med-asr", "med_asr"];
const TELESPEECH_HINTS: &[&str] = &["telespeech", "tele-speech"];
const TONE_HINTS: &[&str] = &["tone", "t-one", "t_one"];

/// Auto-selection order. The first satisfied entry wins.
pub(crate) const AUTO_PRIORITY: &[Priority<SttModelKind>] = &[
    Priority::Always(SttModelKind::NemoTransducer),
    Priority::Always(SttModelKind::Transducer),
    Priority::Always(SttModelKind::NemoCtc),
    Priority::Always(SttModelKind::WenetCtc),
    Priority::Always(SttModelKind::SenseVoice),
    Priority::Hinted(SttModelKind::FunAsrNano),
    Priority::Always(SttModelKind::Paraformer),
    Priority::Always(SttModelKind::Canary),
    Priority::Always(SttModelKind::FireRedAsr),
    Priority::Always(SttModelKind::Whisper),
    Priority::Always(SttModelKind::FunAsrNano),
    Priority::Hinted(SttModelKind::Moonshine),
    Priority::Always(SttModelKind::Dolphin),
    Priority::Always(SttModelKind::Omnilingual),
    Priority::Always(SttModelKind::MedAsr),
    Priority::Always(SttModelKind::TeleSpeechCtc),
    Priority::Always(SttModelKind::ToneCtc),
    Priority::Always(SttModelKind::ZipformerCtc),
    Priority::Always(SttModelKind::Moonshine),
];

/// Files found for each structural part
#[derive(Debug, Clone, Default)]
struct SttProbes {
    encoder: Option<FileEntry>,
    decoder: Option<FileEntry>,
    joiner: Option<FileEntry>,
    model: Option<FileEntry>,
    encoder_adaptor: Option<FileEntry>,
    llm: Option<FileEntry>,
    embedding: Option<FileEntry>,
    tokenizer_dir: Option<PathBuf>,
    preprocessor: Option<FileEntry>,
    moonshine_encoder: Option<FileEntry>,
    uncached_decoder: Option<FileEntry>,
    cached_decoder: Option<FileEntry>,
    tokens: Option<FileEntry>,
}

impl SttProbes {
    fn run(index: &FileIndex, root: &Path, prefer_int8: Option<bool>) -> Self {
        let files = &index.files;
        let no_adaptor = without_tokens(files, &["adaptor"]);
        let no_uncached = without_tokens(files, &["uncached"]);

        let model = find_by_any_token(files, &["model"], prefer_int8)
            .or_else(|| find_largest_excluding(files, MODEL_STOPLIST));

        // the FunASR-Nano tokenizer is a subdirectory holding vocab.json
        let tokenizer_dir = files
            .iter()
            .find(|f| f.name == "vocab.json" && f.directory() != root)
            .map(|f| f.directory().to_path_buf());

        Self {
            encoder: find_by_any_token(&no_adaptor, &["encoder"], prefer_int8).cloned(),
            decoder: find_by_any_token(files, &["decoder"], prefer_int8).cloned(),
            joiner: find_by_any_token(files, &["joiner"], prefer_int8).cloned(),
            model: model.cloned(),
            encoder_adaptor: find_by_any_token(files, &["encoder_adaptor"], prefer_int8).cloned(),
            llm: find_by_any_token(files, &["llm"], prefer_int8).cloned(),
            embedding: find_by_any_token(files, &["embedding"], prefer_int8).cloned(),
            tokenizer_dir,
            preprocessor: find_by_any_token(files, &["preprocess"], prefer_int8).cloned(),
            moonshine_encoder: find_by_any_token(files, &["encode."], prefer_int8).cloned(),
            uncached_decoder: find_by_any_token(files, &["uncached_decode"], prefer_int8).cloned(),
            cached_decoder: find_by_any_token(&no_uncached, &["cached_decode"], prefer_int8)
                .cloned(),
            tokens: find_by_name_or_suffix(files, "tokens.txt").cloned(),
        }
    }
}

/// Directory-name hints, each matched on word boundaries
#[derive(Debug, Clone, Copy, Default)]
struct SttHints {
    nemo: bool,
    nemo_transducer: bool,
    wenet: bool,
    sense_voice: bool,
    zipformer: bool,
    canary: bool,
    fire_red: bool,
    funasr: bool,
    moonshine: bool,
    dolphin: bool,
    omnilingual: bool,
    med_asr: bool,
    tele_speech: bool,
    tone: bool,
}

impl SttHints {
    fn from_path(dir: &Path) -> Self {
        let text = hint_text(dir);
        Self {
            nemo: contains_any_word(&text, NEMO_HINTS),
            nemo_transducer: contains_any_word(&text, NEMO_TRANSDUCER_HINTS),
            wenet: contains_any_word(&text, WENET_HINTS),
            sense_voice: contains_any_word(&text, SENSE_VOICE_HINTS),
            zipformer: contains_any_word(&text, ZIPFORMER_HINTS),
            canary: contains_any_word(&text, CANARY_HINTS),
            fire_red: contains_any_word(&text, FIRE_RED_HINTS),
            funasr: contains_any_word(&text, FUNASR_HINTS),
            moonshine: contains_any_word(&text, MOONSHINE_HINTS),
            dolphin: contains_any_word(&text, DOLPHIN_HINTS),
            omnilingual: contains_any_word(&text, OMNILINGUAL_HINTS),
            med_asr: contains_any_word(&text, MEDASR_HINTS),
            tele_speech: contains_any_word(&text, TELESPEECH_HINTS),
            tone: contains_any_word(&text, TONE_HINTS),
        }
    }

    /// A hint naming some single-file kind other than Paraformer
    fn names_single_model_kind(&self) -> bool {
        self.nemo
            || self.wenet
            || self.sense_voice
            || self.zipformer
            || self.dolphin
            || self.omnilingual
            || self.med_asr
            || self.tele_speech
            || self.tone
    }
}

/// Structural flags derived once per scan
#[derive(Debug, Clone)]
struct SttLayout {
    probes: SttProbes,
    hints: SttHints,
    transducer: bool,
    encoder_decoder: bool,
    single_model: bool,
    fun_asr_nano: bool,
    moonshine: bool,
}

impl SttLayout {
    fn new(probes: SttProbes, hints: SttHints) -> Self {
        let transducer =
            probes.encoder.is_some() && probes.decoder.is_some() && probes.joiner.is_some();
        let encoder_decoder =
            probes.encoder.is_some() && probes.decoder.is_some() && probes.joiner.is_none();
        let fun_asr_nano = probes.encoder_adaptor.is_some()
            && probes.llm.is_some()
            && probes.embedding.is_some()
            && probes.tokenizer_dir.is_some();
        let moonshine = probes.preprocessor.is_some()
            && probes.moonshine_encoder.is_some()
            && probes.uncached_decoder.is_some()
            && probes.cached_decoder.is_some();
        // files of a complete bundle never count as the generic model
        let single_model = probes.model.is_some() && !fun_asr_nano && !moonshine;

        Self {
            probes,
            hints,
            transducer,
            encoder_decoder,
            single_model,
            fun_asr_nano,
            moonshine,
        }
    }

    fn resolve(&self, kind: SttModelKind) -> ResolvedPaths {
        let p = &self.probes;
        let path = |entry: &Option<FileEntry>| entry.as_ref().map(|f| f.path.clone());
        let mut paths = ResolvedPaths::new();

        match kind {
            SttModelKind::Transducer | SttModelKind::NemoTransducer => {
                paths.insert_opt("encoder", path(&p.encoder));
                paths.insert_opt("decoder", path(&p.decoder));
                paths.insert_opt("joiner", path(&p.joiner));
            }
            SttModelKind::Whisper | SttModelKind::Canary | SttModelKind::FireRedAsr => {
                paths.insert_opt("encoder", path(&p.encoder));
                paths.insert_opt("decoder", path(&p.decoder));
            }
            SttModelKind::FunAsrNano => {
                paths.insert_opt("encoderAdaptor", path(&p.encoder_adaptor));
                paths.insert_opt("llm", path(&p.llm));
                paths.insert_opt("embedding", path(&p.embedding));
                paths.insert_opt("tokenizer", p.tokenizer_dir.clone());
            }
            SttModelKind::Moonshine => {
                paths.insert_opt("preprocessor", path(&p.preprocessor));
                paths.insert_opt("encoder", path(&p.moonshine_encoder));
                paths.insert_opt("uncachedDecoder", path(&p.uncached_decoder));
                paths.insert_opt("cachedDecoder", path(&p.cached_decoder));
            }
            SttModelKind::Paraformer
            | SttModelKind::NemoCtc
            | SttModelKind::WenetCtc
            | SttModelKind::SenseVoice
            | SttModelKind::ZipformerCtc
            | SttModelKind::Dolphin
            | SttModelKind::Omnilingual
            | SttModelKind::MedAsr
            | SttModelKind::TeleSpeechCtc
            | SttModelKind::ToneCtc => {
                paths.insert_opt("model", path(&p.model));
            }
            SttModelKind::Unknown => {}
        }
        paths
    }
}

impl Layout<SttModelKind> for SttLayout {
    fn satisfies(&self, kind: SttModelKind) -> bool {
        let h = &self.hints;
        match kind {
            SttModelKind::Transducer => self.transducer,
            SttModelKind::NemoTransducer => self.transducer && h.nemo_transducer,
            SttModelKind::Whisper => self.encoder_decoder,
            SttModelKind::Canary => self.encoder_decoder && h.canary,
            SttModelKind::FireRedAsr => self.encoder_decoder && h.fire_red,
            SttModelKind::FunAsrNano => self.fun_asr_nano,
            SttModelKind::Moonshine => self.moonshine,
            SttModelKind::Paraformer => self.single_model && !h.names_single_model_kind(),
            SttModelKind::NemoCtc => self.single_model && h.nemo,
            SttModelKind::WenetCtc => self.single_model && h.wenet,
            SttModelKind::SenseVoice => self.single_model && h.sense_voice,
            SttModelKind::Dolphin => self.single_model && h.dolphin,
            SttModelKind::Omnilingual => self.single_model && h.omnilingual,
            SttModelKind::MedAsr => self.single_model && h.med_asr,
            SttModelKind::TeleSpeechCtc => self.single_model && h.tele_speech,
            SttModelKind::ToneCtc => self.single_model && h.tone,
            SttModelKind::ZipformerCtc => self.single_model,
            SttModelKind::Unknown => false,
        }
    }

    fn hinted(&self, kind: SttModelKind) -> bool {
        let h = &self.hints;
        match kind {
            SttModelKind::FunAsrNano => h.funasr,
            SttModelKind::Moonshine => h.moonshine,
            SttModelKind::NemoTransducer => h.nemo_transducer,
            SttModelKind::NemoCtc => h.nemo,
            SttModelKind::WenetCtc => h.wenet,
            SttModelKind::SenseVoice => h.sense_voice,
            SttModelKind::ZipformerCtc => h.zipformer,
            SttModelKind::Canary => h.canary,
            SttModelKind::FireRedAsr => h.fire_red,
            SttModelKind::Dolphin => h.dolphin,
            SttModelKind::Omnilingual => h.omnilingual,
            SttModelKind::MedAsr => h.med_asr,
            SttModelKind::TeleSpeechCtc => h.tele_speech,
            SttModelKind::ToneCtc => h.tone,
            SttModelKind::Transducer
            | SttModelKind::Paraformer
            | SttModelKind::Whisper
            | SttModelKind::Unknown => false,
        }
    }

    fn missing_parts(&self, kind: SttModelKind) -> Vec<&'static str> {
        let p = &self.probes;
        let parts: Vec<(&'static str, bool)> = match kind {
            SttModelKind::Transducer | SttModelKind::NemoTransducer => vec![
                ("encoder", p.encoder.is_some()),
                ("decoder", p.decoder.is_some()),
                ("joiner", p.joiner.is_some()),
            ],
            SttModelKind::Whisper | SttModelKind::Canary | SttModelKind::FireRedAsr => vec![
                ("encoder", p.encoder.is_some()),
                ("decoder", p.decoder.is_some()),
            ],
            SttModelKind::FunAsrNano => vec![
                ("encoder_adaptor", p.encoder_adaptor.is_some()),
                ("llm", p.llm.is_some()),
                ("embedding", p.embedding.is_some()),
                ("tokenizer", p.tokenizer_dir.is_some()),
            ],
            SttModelKind::Moonshine => vec![
                ("preprocess", p.preprocessor.is_some()),
                ("encode", p.moonshine_encoder.is_some()),
                ("uncached_decode", p.uncached_decoder.is_some()),
                ("cached_decode", p.cached_decoder.is_some()),
            ],
            SttModelKind::Paraformer
            | SttModelKind::NemoCtc
            | SttModelKind::WenetCtc
            | SttModelKind::SenseVoice
            | SttModelKind::ZipformerCtc
            | SttModelKind::Dolphin
            | SttModelKind::Omnilingual
            | SttModelKind::MedAsr
            | SttModelKind::TeleSpeechCtc
            | SttModelKind::ToneCtc => vec![("model", self.single_model)],
            SttModelKind::Unknown => vec![("model", false)],
        };
        parts
            .into_iter()
            .filter(|(_, found)| !found)
            .map(|(name, _)| name)
            .collect()
    }

    fn primary_directory(&self, kind: SttModelKind) -> Option<PathBuf> {
        let p = &self.probes;
        let primary = match kind {
            SttModelKind::Transducer
            | SttModelKind::NemoTransducer
            | SttModelKind::Whisper
            | SttModelKind::Canary
            | SttModelKind::FireRedAsr => p.encoder.as_ref(),
            SttModelKind::FunAsrNano => p.encoder_adaptor.as_ref(),
            SttModelKind::Moonshine => p.moonshine_encoder.as_ref(),
            SttModelKind::Unknown => None,
            _ => p.model.as_ref(),
        };
        primary.map(|f| f.directory().to_path_buf())
    }
}

/// Classifier for speech-to-text model directories
#[derive(Debug, Clone, Copy, Default)]
pub struct SttClassifier;

impl SttClassifier {
    /// Create a classifier
    pub fn new() -> Self {
        Self
    }
}

impl ModelClassifier for SttClassifier {
    type Kind = SttModelKind;
    type Options = SttDetectOptions;

    fn detect(&self, dir: &Path, options: &SttDetectOptions) -> DetectResult<SttModelKind> {
        let _span = info_span!("detect_stt", dir = %dir.display()).entered();

        let (root, index) = match open_directory(dir) {
            Ok(opened) => opened,
            Err(e) => {
                warn!("STT detection failed: {}", e);
                return DetectResult::failure(Vec::new(), e, Some(true));
            }
        };

        let dir = root.as_path();

        let request = match KindRequest::<SttModelKind>::parse(options.model_type.as_deref()) {
            Ok(request) => request,
            Err(name) => {
                let e = VoxprobeError::unknown_kind(name, dir);
                warn!("STT detection failed: {}", e);
                return DetectResult::failure(Vec::new(), e, Some(true));
            }
        };

        let probes = SttProbes::run(&index, dir, options.prefer_int8);
        let layout = SttLayout::new(probes, SttHints::from_path(dir));
        if options.debug {
            info!("STT probes for {:?}: {:#?}", dir, layout.probes);
            info!(
                "STT layout: transducer={} encoder_decoder={} single_model={} funasr_nano={} moonshine={} hints={:?}",
                layout.transducer,
                layout.encoder_decoder,
                layout.single_model,
                layout.fun_asr_nano,
                layout.moonshine,
                layout.hints
            );
        }

        let candidates = collect_candidates(&layout, dir);
        debug!(
            "STT candidates: {:?}",
            candidates.iter().map(|c| c.kind.as_str()).collect::<Vec<_>>()
        );

        let kind = match select_kind(request, &layout, AUTO_PRIORITY, dir) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("STT detection failed: {}", e);
                let tokens_required = match request {
                    KindRequest::Explicit(kind) => kind.requires_tokens(),
                    KindRequest::Auto => true,
                };
                return DetectResult::failure(candidates, e, Some(tokens_required));
            }
        };
        debug!("Selected STT model kind: {}", kind);

        let mut paths = layout.resolve(kind);
        let tokens_required = kind.requires_tokens();
        if tokens_required {
            match &layout.probes.tokens {
                Some(tokens) => paths.insert("tokens", tokens.path.clone()),
                None => {
                    let e = VoxprobeError::missing_tokens(dir);
                    warn!("STT detection failed: {}", e);
                    return DetectResult::failure(candidates, e, Some(true));
                }
            }
        }

        let vanished = paths.missing_on_disk();
        if !vanished.is_empty() {
            let e = VoxprobeError::structural_mismatch(kind.as_str(), vanished, dir);
            warn!("STT detection failed: {}", e);
            return DetectResult::failure(candidates, e, Some(tokens_required));
        }

        DetectResult::success(candidates, kind, paths, Some(tokens_required))
    }
}
