//! Detection options and their TOML configuration file.

use serde::Deserialize;
use std::path::Path;

use crate::error::{VoxprobeError, VoxprobeResult};

/// Options for speech-to-text detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SttDetectOptions {
    /// Quantized weight preference; `None` prefers int8 when both exist
    #[serde(alias = "prefer_int8")]
    pub prefer_int8: Option<bool>,
    /// Kind to validate, or `None`/`"auto"` for priority selection
    #[serde(alias = "model_type")]
    pub model_type: Option<String>,
    /// Log probe details; never changes the outcome
    pub debug: bool,
}

impl SttDetectOptions {
    /// Options for automatic detection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantization preference
    #[must_use]
    pub fn with_prefer_int8(mut self, prefer_int8: bool) -> Self {
        self.prefer_int8 = Some(prefer_int8);
        self
    }

    /// Request a specific kind by catalogue name (`"auto"` allowed)
    #[must_use]
    pub fn with_model_type<S: Into<String>>(mut self, model_type: S) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Enable detailed probe logging
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overlay the fields set in `other`
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        if other.prefer_int8.is_some() {
            self.prefer_int8 = other.prefer_int8;
        }
        if other.model_type.is_some() {
            self.model_type.clone_from(&other.model_type);
        }
        self.debug |= other.debug;
        self
    }
}

/// Options for text-to-speech detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TtsDetectOptions {
    /// Kind to validate, or `None`/`"auto"` for priority selection
    #[serde(alias = "model_type")]
    pub model_type: Option<String>,
    /// Log probe details; never changes the outcome
    pub debug: bool,
}

impl TtsDetectOptions {
    /// Options for automatic detection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific kind by catalogue name (`"auto"` allowed)
    #[must_use]
    pub fn with_model_type<S: Into<String>>(mut self, model_type: S) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Enable detailed probe logging
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overlay the fields set in `other`
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        if other.model_type.is_some() {
            self.model_type.clone_from(&other.model_type);
        }
        self.debug |= other.debug;
        self
    }
}

/// Configuration file contents
///
/// ```toml
/// [stt]
/// prefer_int8 = false
/// model_type = "auto"
///
/// [tts]
/// model_type = "kokoro"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectConfig {
    /// Speech-to-text defaults
    pub stt: SttDetectOptions,
    /// Text-to-speech defaults
    pub tts: TtsDetectOptions,
}

impl DetectConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid TOML or has
    /// unexpected sections
    pub fn from_toml_str(text: &str) -> VoxprobeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> VoxprobeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            VoxprobeError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded detection config from {:?}", path);
        Ok(config)
    }
}
