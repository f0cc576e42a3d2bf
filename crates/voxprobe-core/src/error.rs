//! Error types for the Voxprobe detection engine.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result type alias for Voxprobe operations
pub type VoxprobeResult<T> = Result<T, VoxprobeError>;

/// Main error type for model directory detection
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxprobeError {
    /// No model directory was supplied
    #[error("Model directory path is empty")]
    EmptyPath,

    /// The model directory does not exist
    #[error("Model directory does not exist: {}", .dir.display())]
    DirectoryNotFound {
        /// The directory that was requested
        dir: PathBuf,
    },

    /// The model path exists but is not a directory
    #[error("Not a directory: {}", .dir.display())]
    NotADirectory {
        /// The offending path
        dir: PathBuf,
    },

    /// The directory holds no files within the scan depth
    #[error("No files found in model directory: {}", .dir.display())]
    EmptyDirectory {
        /// The scanned directory
        dir: PathBuf,
    },

    /// The caller requested a model kind outside the catalogue
    #[error("Unknown model type '{kind}' requested for {}", .dir.display())]
    UnknownExplicitKind {
        /// The kind name as supplied by the caller
        kind: String,
        /// The scanned directory
        dir: PathBuf,
    },

    /// An explicit (or selected) kind is missing some of its files
    #[error("{kind} model files not found in {} (missing: {})", .dir.display(), MissingList(.missing))]
    StructuralMismatch {
        /// Catalogue name of the kind
        kind: String,
        /// Names of the parts that were not found
        missing: Vec<String>,
        /// The scanned directory
        dir: PathBuf,
    },

    /// Auto detection found no structurally satisfied kind
    #[error("No compatible model type detected in {}", .dir.display())]
    NoCandidateDetected {
        /// The scanned directory
        dir: PathBuf,
    },

    /// The model files are present but the tokens file is not
    #[error("Tokens file not found in {}", .dir.display())]
    MissingTokens {
        /// The scanned directory
        dir: PathBuf,
    },

    /// The model files are present but espeak-ng-data is not
    #[error("espeak-ng-data directory not found in {}", .dir.display())]
    MissingEspeakData {
        /// The scanned directory
        dir: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// File I/O error
    #[error("File I/O error: {message}")]
    Io {
        /// Error message describing the file operation failure
        message: String,
    },
}

struct MissingList<'a>(&'a [String]);

impl fmt::Display for MissingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl VoxprobeError {
    /// Create a directory-not-found error
    #[must_use]
    pub fn directory_not_found(dir: &Path) -> Self {
        Self::DirectoryNotFound {
            dir: dir.to_path_buf(),
        }
    }

    /// Create a not-a-directory error
    #[must_use]
    pub fn not_a_directory(dir: &Path) -> Self {
        Self::NotADirectory {
            dir: dir.to_path_buf(),
        }
    }

    /// Create an empty-directory error
    #[must_use]
    pub fn empty_directory(dir: &Path) -> Self {
        Self::EmptyDirectory {
            dir: dir.to_path_buf(),
        }
    }

    /// Create an unknown explicit kind error
    #[must_use]
    pub fn unknown_kind<S: Into<String>>(kind: S, dir: &Path) -> Self {
        Self::UnknownExplicitKind {
            kind: kind.into(),
            dir: dir.to_path_buf(),
        }
    }

    /// Create a structural mismatch error
    #[must_use]
    pub fn structural_mismatch<S: Into<String>>(kind: S, missing: Vec<String>, dir: &Path) -> Self {
        Self::StructuralMismatch {
            kind: kind.into(),
            missing,
            dir: dir.to_path_buf(),
        }
    }

    /// Create a no-candidate error
    #[must_use]
    pub fn no_candidate(dir: &Path) -> Self {
        Self::NoCandidateDetected {
            dir: dir.to_path_buf(),
        }
    }

    /// Create a missing tokens error
    #[must_use]
    pub fn missing_tokens(dir: &Path) -> Self {
        Self::MissingTokens {
            dir: dir.to_path_buf(),
        }
    }

    /// Create a missing espeak-ng-data error
    #[must_use]
    pub fn missing_espeak_data(dir: &Path) -> Self {
        Self::MissingEspeakData {
            dir: dir.to_path_buf(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    #[must_use]
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Check if the error was raised before any scan took place
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPath | Self::DirectoryNotFound { .. } | Self::NotADirectory { .. }
        )
    }

    /// Check if the right model was found but its package is incomplete
    #[must_use]
    pub const fn is_incomplete_package(&self) -> bool {
        matches!(
            self,
            Self::MissingTokens { .. } | Self::MissingEspeakData { .. }
        )
    }

    /// Get the error category for logging
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::EmptyPath | Self::DirectoryNotFound { .. } | Self::NotADirectory { .. } => "input",
            Self::EmptyDirectory { .. } => "empty_directory",
            Self::UnknownExplicitKind { .. } => "unknown_kind",
            Self::StructuralMismatch { .. } => "structural_mismatch",
            Self::NoCandidateDetected { .. } => "no_candidate",
            Self::MissingTokens { .. } | Self::MissingEspeakData { .. } => "incomplete_package",
            Self::Config { .. } => "configuration",
            Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for VoxprobeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for VoxprobeError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Invalid TOML: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_directory() {
        let dir = Path::new("/models/whisper-tiny");
        let err = VoxprobeError::missing_tokens(dir);
        assert_eq!(err.to_string(), "Tokens file not found in /models/whisper-tiny");

        let err = VoxprobeError::no_candidate(dir);
        assert_eq!(
            err.to_string(),
            "No compatible model type detected in /models/whisper-tiny"
        );
    }

    #[test]
    fn test_structural_mismatch_lists_missing_parts() {
        let err = VoxprobeError::structural_mismatch(
            "transducer",
            vec!["joiner".to_string(), "decoder".to_string()],
            Path::new("/m"),
        );
        assert_eq!(
            err.to_string(),
            "transducer model files not found in /m (missing: joiner, decoder)"
        );
    }

    #[test]
    fn test_error_categories() {
        let dir = Path::new("/m");
        assert_eq!(VoxprobeError::EmptyPath.category(), "input");
        assert_eq!(VoxprobeError::not_a_directory(dir).category(), "input");
        assert_eq!(VoxprobeError::empty_directory(dir).category(), "empty_directory");
        assert_eq!(VoxprobeError::unknown_kind("x", dir).category(), "unknown_kind");
        assert_eq!(VoxprobeError::no_candidate(dir).category(), "no_candidate");
        assert_eq!(VoxprobeError::missing_espeak_data(dir).category(), "incomplete_package");
        assert_eq!(VoxprobeError::config("bad").category(), "configuration");
    }

    #[test]
    fn test_input_and_incomplete_predicates() {
        let dir = Path::new("/m");
        assert!(VoxprobeError::EmptyPath.is_input_error());
        assert!(VoxprobeError::directory_not_found(dir).is_input_error());
        assert!(!VoxprobeError::no_candidate(dir).is_input_error());

        assert!(VoxprobeError::missing_tokens(dir).is_incomplete_package());
        assert!(VoxprobeError::missing_espeak_data(dir).is_incomplete_package());
        assert!(!VoxprobeError::no_candidate(dir).is_incomplete_package());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = VoxprobeError::from(io_err);
        assert!(matches!(err, VoxprobeError::Io { .. }));
    }
}
