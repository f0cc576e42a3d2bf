// Model kinds, scan entries and detection results

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::VoxprobeError;

/// A regular file found while indexing a model directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// Case-folded file name, used by every matcher
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create an entry, folding the file name of `path` to lowercase
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, name, size }
    }

    /// Check for the `.onnx` extension
    pub fn is_onnx(&self) -> bool {
        self.name.ends_with(".onnx")
    }

    /// Directory holding this file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Behaviour shared by the speech-to-text and text-to-speech kind catalogues
pub trait ModelKind: Copy + Eq + fmt::Debug + fmt::Display + Serialize + 'static {
    /// The placeholder reported when nothing was selected
    const UNKNOWN: Self;

    /// Every concrete kind, in catalogue order
    fn all() -> &'static [Self];

    /// Catalogue name of the kind
    fn as_str(&self) -> &'static str;

    /// Whether a tokens file must accompany the model files
    fn requires_tokens(&self) -> bool;

    /// Parse a catalogue name: case-insensitive, `-` accepted for `_`.
    /// `unknown` is not a selectable kind and parses to `None`.
    fn parse_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        Self::all().iter().copied().find(|k| k.as_str() == normalized)
    }
}

macro_rules! model_kind {
    (
        $(#[$meta:meta])*
        $name:ident (tokens optional for $no_tokens:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// No kind selected
            Unknown,
        }

        impl $name {
            /// Every concrete kind, in catalogue order
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];
        }

        impl ModelKind for $name {
            const UNKNOWN: Self = Self::Unknown;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                    Self::Unknown => "unknown",
                }
            }

            fn requires_tokens(&self) -> bool {
                !matches!(self, Self::$no_tokens)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = VoxprobeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as ModelKind>::parse_name(s)
                    .ok_or_else(|| VoxprobeError::config(format!("unknown model type '{s}'")))
            }
        }
    };
}

model_kind! {
    /// Speech-to-text model architectures
    SttModelKind (tokens optional for FunAsrNano) {
        /// Zipformer style encoder, decoder and joiner
        Transducer => "transducer",
        /// NeMo transducer (Parakeet TDT and friends)
        NemoTransducer => "nemo_transducer",
        /// Single-file non-autoregressive Paraformer
        Paraformer => "paraformer",
        /// NeMo CTC
        NemoCtc => "nemo_ctc",
        /// WeNet CTC
        WenetCtc => "wenet_ctc",
        /// SenseVoice
        SenseVoice => "sense_voice",
        /// Generic zipformer CTC
        ZipformerCtc => "zipformer_ctc",
        /// Whisper encoder and decoder
        Whisper => "whisper",
        /// FunASR-Nano LLM bundle
        FunAsrNano => "funasr_nano",
        /// FireRedAsr encoder and decoder
        FireRedAsr => "fire_red_asr",
        /// Moonshine four-part bundle
        Moonshine => "moonshine",
        /// Dolphin CTC
        Dolphin => "dolphin",
        /// Canary encoder and decoder
        Canary => "canary",
        /// Omnilingual CTC
        Omnilingual => "omnilingual",
        /// MedAsr CTC
        MedAsr => "medasr",
        /// TeleSpeech CTC
        TeleSpeechCtc => "telespeech_ctc",
        /// T-one CTC
        ToneCtc => "tone_ctc",
    }
}

model_kind! {
    /// Text-to-speech model architectures
    TtsModelKind (tokens optional for Pocket) {
        /// VITS / Piper single model
        Vits => "vits",
        /// Matcha acoustic model plus vocoder
        Matcha => "matcha",
        /// Kokoro model plus voices
        Kokoro => "kokoro",
        /// KittenTTS model plus voices
        Kitten => "kitten",
        /// Pocket seven-part bundle
        Pocket => "pocket",
        /// ZipVoice encoder, decoder and vocoder
        ZipVoice => "zipvoice",
    }
}

/// What the caller asked the classifier to select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindRequest<K> {
    /// Pick by priority among the detected candidates
    Auto,
    /// Validate exactly this kind
    Explicit(K),
}

impl<K: ModelKind> KindRequest<K> {
    /// Parse the caller's model type string.
    ///
    /// `None`, an empty string and `auto` select [`KindRequest::Auto`]. The
    /// error carries the rejected name.
    pub fn parse(model_type: Option<&str>) -> Result<Self, String> {
        let Some(raw) = model_type.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Auto);
        };
        if raw.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        K::parse_name(raw).map(Self::Explicit).ok_or_else(|| raw.to_string())
    }
}

/// A kind whose structural probes were satisfied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionCandidate<K: ModelKind> {
    /// Detected kind
    pub kind: K,
    /// Directory holding the kind's primary file
    pub directory: PathBuf,
}

/// Resolved file paths for the selected kind, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedPaths(BTreeMap<String, PathBuf>);

impl ResolvedPaths {
    /// Create an empty set of paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the path for a field
    pub fn insert<P: Into<PathBuf>>(&mut self, field: &str, path: P) {
        self.0.insert(field.to_string(), path.into());
    }

    /// Record the path for a field when one was found
    pub fn insert_opt<P: Into<PathBuf>>(&mut self, field: &str, path: Option<P>) {
        if let Some(path) = path {
            self.insert(field, path);
        }
    }

    /// Path recorded for a field
    pub fn get(&self, field: &str) -> Option<&Path> {
        self.0.get(field).map(PathBuf::as_path)
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no field is populated
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, path)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Fields whose paths are no longer present on disk
    pub fn missing_on_disk(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(field, _)| field.clone())
            .collect()
    }
}

/// Outcome of one classification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResult<K: ModelKind> {
    /// True when a concrete kind was selected and verified
    pub ok: bool,
    /// Failure reason, present iff `ok` is false
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<VoxprobeError>,
    /// Every structurally satisfied kind, in detection order
    pub candidates: Vec<DetectionCandidate<K>>,
    /// The selected kind, `unknown` on failure
    pub selected_kind: K,
    /// Paths for the selected kind only
    pub resolved_paths: ResolvedPaths,
    /// Whether the selected kind needs a tokens file (speech-to-text only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_required: Option<bool>,
}

fn serialize_error<S: Serializer>(
    error: &Option<VoxprobeError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl<K: ModelKind> DetectResult<K> {
    /// A successful detection
    pub fn success(
        candidates: Vec<DetectionCandidate<K>>,
        kind: K,
        resolved_paths: ResolvedPaths,
        tokens_required: Option<bool>,
    ) -> Self {
        Self {
            ok: true,
            error: None,
            candidates,
            selected_kind: kind,
            resolved_paths,
            tokens_required,
        }
    }

    /// A failed detection; the selected kind is always `unknown`
    pub fn failure(
        candidates: Vec<DetectionCandidate<K>>,
        error: VoxprobeError,
        tokens_required: Option<bool>,
    ) -> Self {
        Self {
            ok: false,
            error: Some(error),
            candidates,
            selected_kind: K::UNKNOWN,
            resolved_paths: ResolvedPaths::new(),
            tokens_required,
        }
    }

    /// Failure message, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Kinds of all candidates, in detection order
    pub fn candidate_kinds(&self) -> Vec<K> {
        self.candidates.iter().map(|c| c.kind).collect()
    }

    /// Serialize into the JSON shape handed across the bridging boundary
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip_through_parse() {
        for kind in SttModelKind::ALL {
            assert_eq!(SttModelKind::parse_name(kind.as_str()), Some(*kind));
        }
        for kind in TtsModelKind::ALL {
            assert_eq!(kind.as_str().parse::<TtsModelKind>().ok(), Some(*kind));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_accepts_dashes() {
        assert_eq!(SttModelKind::parse_name("NeMo-Transducer"), Some(SttModelKind::NemoTransducer));
        assert_eq!(SttModelKind::parse_name(" Whisper "), Some(SttModelKind::Whisper));
        assert_eq!(TtsModelKind::parse_name("ZIPVOICE"), Some(TtsModelKind::ZipVoice));
    }

    #[test]
    fn test_unknown_is_not_selectable() {
        assert_eq!(SttModelKind::parse_name("unknown"), None);
        assert!(!SttModelKind::ALL.contains(&SttModelKind::Unknown));
        assert!("unknown".parse::<TtsModelKind>().is_err());
    }

    #[test]
    fn test_kind_request_parsing() {
        assert_eq!(KindRequest::<SttModelKind>::parse(None), Ok(KindRequest::Auto));
        assert_eq!(KindRequest::<SttModelKind>::parse(Some("")), Ok(KindRequest::Auto));
        assert_eq!(KindRequest::<SttModelKind>::parse(Some("AUTO")), Ok(KindRequest::Auto));
        assert_eq!(
            KindRequest::<SttModelKind>::parse(Some("moonshine")),
            Ok(KindRequest::Explicit(SttModelKind::Moonshine))
        );
        assert_eq!(
            KindRequest::<TtsModelKind>::parse(Some("tacotron")),
            Err("tacotron".to_string())
        );
    }

    #[test]
    fn test_tokens_requirement() {
        assert!(SttModelKind::Whisper.requires_tokens());
        assert!(!SttModelKind::FunAsrNano.requires_tokens());
        assert!(TtsModelKind::Kokoro.requires_tokens());
        assert!(!TtsModelKind::Pocket.requires_tokens());
    }

    #[test]
    fn test_file_entry_folds_name() {
        let entry = FileEntry::new(PathBuf::from("/m/Encoder.INT8.onnx"), 10);
        assert_eq!(entry.name, "encoder.int8.onnx");
        assert!(entry.is_onnx());
        assert_eq!(entry.directory(), Path::new("/m"));
    }

    #[test]
    fn test_failure_result_serializes_error_and_unknown_kind() {
        let result: DetectResult<SttModelKind> = DetectResult::failure(
            Vec::new(),
            VoxprobeError::no_candidate(Path::new("/m")),
            Some(true),
        );
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["selectedKind"], "unknown");
        assert_eq!(json["error"], "No compatible model type detected in /m");
        assert_eq!(json["tokensRequired"], true);
        assert!(json["resolvedPaths"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_success_result_omits_error() {
        let mut paths = ResolvedPaths::new();
        paths.insert("model", "/m/model.onnx");
        let result: DetectResult<TtsModelKind> = DetectResult::success(
            vec![DetectionCandidate {
                kind: TtsModelKind::Vits,
                directory: PathBuf::from("/m"),
            }],
            TtsModelKind::Vits,
            paths,
            None,
        );
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("tokensRequired").is_none());
        assert_eq!(json["candidates"][0]["kind"], "vits");
        assert_eq!(json["resolvedPaths"]["model"], "/m/model.onnx");
    }
}
