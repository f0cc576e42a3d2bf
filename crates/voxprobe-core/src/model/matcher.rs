//! File name matchers used by the classifiers.
//!
//! Every matcher works on the case-folded names produced by the indexer, is
//! deterministic for a given scan order and reports "not found" as `None`.

use super::types::FileEntry;

/// Quantization marker looked for when both weight variants ship together
const INT8_TOKEN: &str = "int8";

/// First entry whose name equals `name`
pub fn find_by_exact_name<'a>(files: &'a [FileEntry], name: &str) -> Option<&'a FileEntry> {
    let name = name.to_lowercase();
    files.iter().find(|f| f.name == name)
}

/// First entry whose name equals or ends with `suffix`
/// (`tiny.en-tokens.txt` matches `tokens.txt`)
pub fn find_by_suffix<'a>(files: &'a [FileEntry], suffix: &str) -> Option<&'a FileEntry> {
    let suffix = suffix.to_lowercase();
    files.iter().find(|f| f.name.ends_with(&suffix))
}

/// Exact match first, suffix match otherwise
pub fn find_by_name_or_suffix<'a>(files: &'a [FileEntry], name: &str) -> Option<&'a FileEntry> {
    find_by_exact_name(files, name).or_else(|| find_by_suffix(files, name))
}

/// First entry whose name starts with `prefix` and ends with `suffix`
/// (`lexicon-us-en.txt` matches `lexicon` + `.txt`)
pub fn find_by_prefix_and_suffix<'a>(
    files: &'a [FileEntry],
    prefix: &str,
    suffix: &str,
) -> Option<&'a FileEntry> {
    let prefix = prefix.to_lowercase();
    let suffix = suffix.to_lowercase();
    files
        .iter()
        .find(|f| f.name.starts_with(&prefix) && f.name.ends_with(&suffix))
}

/// Pick an `.onnx` file whose name contains any of `tokens`.
///
/// `prefer_int8`: `Some(true)` prefers a name containing `int8`, `Some(false)`
/// prefers one without it, `None` behaves like `Some(true)`. Without a
/// preferred match the first match in scan order wins.
pub fn find_by_any_token<'a>(
    files: &'a [FileEntry],
    tokens: &[&str],
    prefer_int8: Option<bool>,
) -> Option<&'a FileEntry> {
    let mut matches = files
        .iter()
        .filter(|f| f.is_onnx() && tokens.iter().any(|t| f.name.contains(t)))
        .peekable();
    let first = *matches.peek()?;

    let want_int8 = prefer_int8.unwrap_or(true);
    matches
        .find(|f| f.name.contains(INT8_TOKEN) == want_int8)
        .or(Some(first))
}

/// Largest `.onnx` file whose name contains none of `exclude_tokens`.
/// Ties go to the earliest file in scan order.
pub fn find_largest_excluding<'a>(
    files: &'a [FileEntry],
    exclude_tokens: &[&str],
) -> Option<&'a FileEntry> {
    files
        .iter()
        .filter(|f| f.is_onnx() && !exclude_tokens.iter().any(|t| f.name.contains(t)))
        .fold(None, |best: Option<&FileEntry>, f| match best {
            Some(b) if b.size >= f.size => Some(b),
            _ => Some(f),
        })
}

/// Copy of `files` without entries whose name contains any of `tokens`
pub fn without_tokens(files: &[FileEntry], tokens: &[&str]) -> Vec<FileEntry> {
    files
        .iter()
        .filter(|f| !tokens.iter().any(|t| f.name.contains(t)))
        .cloned()
        .collect()
}

fn is_word_separator(c: char) -> bool {
    matches!(c, '/' | '\\' | '-' | '_' | '.' | ' ')
}

/// True iff `word` occurs in `haystack` delimited on both sides by a path or
/// name separator (`/ - _ .` or space) or by the string boundary.
///
/// `contains_word("sherpa-onnx-t-one-ru", "t-one")` holds while
/// `contains_word("cantonese", "tone")` does not. Comparison is
/// case-insensitive.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    let word = word.to_lowercase();

    haystack.match_indices(&word).any(|(start, _)| {
        let end = start + word.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, is_word_separator);
        let after_ok = haystack[end..].chars().next().map_or(true, is_word_separator);
        before_ok && after_ok
    })
}

/// True iff any of `words` is a delimited word of `haystack`
pub fn contains_any_word(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| contains_word(haystack, w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn entry(name: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from("/m").join(name), size)
    }

    fn files(names: &[&str]) -> Vec<FileEntry> {
        names.iter().map(|n| entry(n, 1)).collect()
    }

    #[test]
    fn test_exact_name_is_case_insensitive() {
        let list = files(&["Tokens.txt", "model.onnx"]);
        assert_eq!(find_by_exact_name(&list, "tokens.txt").unwrap().name, "tokens.txt");
        assert!(find_by_exact_name(&list, "voices.bin").is_none());
    }

    #[test]
    fn test_suffix_matches_prefixed_variants() {
        let list = files(&["tiny.en-encoder.onnx", "tiny.en-tokens.txt"]);
        assert_eq!(find_by_suffix(&list, "tokens.txt").unwrap().name, "tiny.en-tokens.txt");
        assert_eq!(
            find_by_name_or_suffix(&list, "tokens.txt").unwrap().name,
            "tiny.en-tokens.txt"
        );
    }

    #[test]
    fn test_exact_name_beats_suffix() {
        let list = files(&["big-tokens.txt", "tokens.txt"]);
        assert_eq!(find_by_name_or_suffix(&list, "tokens.txt").unwrap().name, "tokens.txt");
    }

    #[test]
    fn test_prefix_and_suffix_match() {
        let list = files(&["lexicon-us-en.txt", "lexicon-zh.txt", "lexicon.bin"]);
        assert_eq!(
            find_by_prefix_and_suffix(&list, "lexicon", ".txt").unwrap().name,
            "lexicon-us-en.txt"
        );
        assert!(find_by_prefix_and_suffix(&list, "tokens", ".txt").is_none());
    }

    #[rstest]
    #[case(Some(true), "model.int8.onnx")]
    #[case(Some(false), "model.onnx")]
    #[case(None, "model.int8.onnx")]
    fn test_any_token_quantization_preference(
        #[case] prefer_int8: Option<bool>,
        #[case] expected: &str,
    ) {
        let list = files(&["model.onnx", "model.int8.onnx"]);
        let found = find_by_any_token(&list, &["model"], prefer_int8).unwrap();
        assert_eq!(found.name, expected);
    }

    #[rstest]
    #[case(Some(true))]
    #[case(Some(false))]
    #[case(None)]
    fn test_any_token_falls_back_to_first_match(#[case] prefer_int8: Option<bool>) {
        let only_int8 = files(&["encoder.int8.onnx"]);
        assert_eq!(
            find_by_any_token(&only_int8, &["encoder"], prefer_int8).unwrap().name,
            "encoder.int8.onnx"
        );
        let only_full = files(&["encoder.onnx"]);
        assert_eq!(
            find_by_any_token(&only_full, &["encoder"], prefer_int8).unwrap().name,
            "encoder.onnx"
        );
    }

    #[test]
    fn test_any_token_ignores_non_onnx_files() {
        let list = files(&["model.txt", "readme-model.md"]);
        assert!(find_by_any_token(&list, &["model"], None).is_none());
    }

    #[test]
    fn test_largest_excluding_skips_stoplist() {
        let list = vec![
            entry("encoder.onnx", 900),
            entry("small.onnx", 10),
            entry("big.onnx", 500),
            entry("notes.txt", 10_000),
        ];
        let found = find_largest_excluding(&list, &["encoder"]).unwrap();
        assert_eq!(found.name, "big.onnx");
    }

    #[test]
    fn test_largest_excluding_is_stable_on_ties() {
        let list = vec![entry("first.onnx", 7), entry("second.onnx", 7)];
        assert_eq!(find_largest_excluding(&list, &[]).unwrap().name, "first.onnx");
    }

    #[test]
    fn test_largest_excluding_none_left() {
        let list = vec![entry("joiner.onnx", 7)];
        assert!(find_largest_excluding(&list, &["joiner"]).is_none());
    }

    #[test]
    fn test_without_tokens() {
        let list = files(&["encoder_adaptor.onnx", "encoder.onnx"]);
        let kept = without_tokens(&list, &["adaptor"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "encoder.onnx");
    }

    #[rstest]
    #[case("/models/sherpa-onnx-t-one-russian", "t-one", true)]
    #[case("/models/sherpa-onnx-cantonese-ctc", "tone", false)]
    #[case("/models/tone", "tone", true)]
    #[case("tone_ctc", "tone", true)]
    #[case("/models/Sherpa-Onnx-NeMo-CTC", "nemo", true)]
    #[case("/models/nemotron", "nemo", false)]
    #[case("/models/sense voice", "sense", true)]
    #[case("/models/a.canary.b", "canary", true)]
    #[case("/models/kokoro", "", false)]
    fn test_contains_word(#[case] haystack: &str, #[case] word: &str, #[case] expected: bool) {
        assert_eq!(contains_word(haystack, word), expected);
    }

    #[test]
    fn test_contains_word_checks_every_occurrence() {
        // first occurrence is embedded, second is delimited
        assert!(contains_word("/cantonese/tone-model", "tone"));
    }

    proptest! {
        #[test]
        fn prop_word_embedded_in_letters_never_matches(
            prefix in "[a-z]{1,8}",
            suffix in "[a-z]{1,8}",
        ) {
            let haystack = format!("/{prefix}tone{suffix}/");
            prop_assert!(!contains_word(&haystack, "tone"));
        }

        #[test]
        fn prop_delimited_word_always_matches(
            left in "[a-z]{0,8}",
            right in "[a-z]{0,8}",
            sep in prop::sample::select(vec!['/', '-', '_', '.', ' ']),
        ) {
            let haystack = format!("{left}{sep}tone{sep}{right}");
            prop_assert!(contains_word(&haystack, "tone"));
        }
    }
}
