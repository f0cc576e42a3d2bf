//! Voxprobe CLI - classify a speech model directory and print the result as JSON

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voxprobe_core::{
    detect_stt_model, detect_tts_model, DetectConfig, ModelKind, SttDetectOptions, SttModelKind,
    TtsDetectOptions, TtsModelKind,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "VOXPROBE_LOG";

/// Exit status when detection ran but did not select a kind
const EXIT_NOT_DETECTED: u8 = 2;

/// Voxprobe - detect which speech model architecture a directory holds
///
/// Examples:
///   voxprobe stt ./sherpa-onnx-zipformer-en          # Auto-detect an STT model
///   voxprobe stt ./model --model-type whisper        # Validate an explicit kind
///   voxprobe tts ./kokoro-en-v0_19                   # Auto-detect a TTS model
///   voxprobe kinds                                   # List the kind catalogues
#[derive(Debug, Parser)]
#[command(
    name = "voxprobe",
    about = "Detect speech model architectures on disk",
    version = env!("CARGO_PKG_VERSION"),
    arg_required_else_help = true,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log probe details to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a speech-to-text model directory
    Stt {
        /// Model directory
        dir: PathBuf,

        /// Kind to validate instead of auto detection
        #[arg(long, value_name = "KIND")]
        model_type: Option<String>,

        /// Prefer int8 weights (`true`) or full precision (`false`)
        #[arg(long, value_name = "BOOL")]
        prefer_int8: Option<bool>,
    },

    /// Classify a text-to-speech model directory
    Tts {
        /// Model directory
        dir: PathBuf,

        /// Kind to validate instead of auto detection
        #[arg(long, value_name = "KIND")]
        model_type: Option<String>,
    },

    /// List every known model kind
    Kinds,
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "voxprobe_core=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DetectConfig> {
    match path {
        Some(path) => DetectConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(DetectConfig::default()),
    }
}

fn stt_options(
    config: &DetectConfig,
    model_type: Option<String>,
    prefer_int8: Option<bool>,
    debug: bool,
) -> SttDetectOptions {
    let overrides = SttDetectOptions {
        prefer_int8,
        model_type,
        debug,
    };
    config.stt.clone().merged_with(&overrides)
}

fn tts_options(config: &DetectConfig, model_type: Option<String>, debug: bool) -> TtsDetectOptions {
    let overrides = TtsDetectOptions { model_type, debug };
    config.tts.clone().merged_with(&overrides)
}

fn catalogue<K: ModelKind>() -> Vec<serde_json::Value> {
    K::all()
        .iter()
        .map(|kind| json!({ "kind": kind.as_str(), "requiresTokens": kind.requires_tokens() }))
        .collect()
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    let (ok, output) = match cli.command {
        Commands::Stt {
            dir,
            model_type,
            prefer_int8,
        } => {
            let options = stt_options(&config, model_type, prefer_int8, cli.debug);
            debug!("STT options: {:?}", options);
            let result = detect_stt_model(&dir, &options);
            (result.ok, result.to_json()?)
        }
        Commands::Tts { dir, model_type } => {
            let options = tts_options(&config, model_type, cli.debug);
            debug!("TTS options: {:?}", options);
            let result = detect_tts_model(&dir, &options);
            (result.ok, result.to_json()?)
        }
        Commands::Kinds => {
            let kinds = json!({
                "stt": catalogue::<SttModelKind>(),
                "tts": catalogue::<TtsModelKind>(),
            });
            (true, serde_json::to_string_pretty(&kinds)?)
        }
    };

    println!("{output}");
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NOT_DETECTED)
    })
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    run(cli)
}
