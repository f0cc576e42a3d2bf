//! Detection must not depend on how the directory path is spelled.
//!
//! Kept in its own test binary because it changes the working directory.

use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use voxprobe_core::{detect_stt_model, SttDetectOptions, SttModelKind};

#[test]
fn test_relative_spellings_classify_like_the_absolute_path() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("sherpa-onnx-t-one-russian");
    fs::create_dir_all(dir.join("exp")).expect("Should create model directory");
    fs::write(dir.join("model.onnx"), vec![0u8; 16]).expect("Should write model");
    fs::write(dir.join("tokens.txt"), b"a 0\n").expect("Should write tokens");
    let options = SttDetectOptions::new();

    let absolute = detect_stt_model(&dir, &options);
    assert!(absolute.ok, "unexpected failure: {:?}", absolute.error);
    assert_eq!(absolute.selected_kind, SttModelKind::ToneCtc);

    env::set_current_dir(&dir).expect("Should enter model directory");
    let dot = detect_stt_model(Path::new("."), &options);
    let up = detect_stt_model(Path::new("exp/.."), &options);
    env::set_current_dir(temp_dir.path()).expect("Should leave model directory");
    let relative = detect_stt_model(Path::new("sherpa-onnx-t-one-russian"), &options);

    for result in [&dot, &up, &relative] {
        assert_eq!(result.selected_kind, SttModelKind::ToneCtc);
        assert_eq!(result, &absolute);
    }
    assert!(!dot.candidate_kinds().contains(&SttModelKind::Paraformer));
}
