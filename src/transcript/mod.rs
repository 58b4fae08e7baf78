use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod normalize;
pub mod repetition;

pub use normalize::{normalize_text, split_into_sentences};

/// Which cleaning passes run over a raw transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CleaningMode {
    /// Word-level run removal followed by sentence dedup and echo removal
    #[default]
    Full,
    /// Sentence dedup and echo removal only
    #[value(alias = "sentences")]
    SentencesOnly,
}

impl std::fmt::Display for CleaningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleaningMode::Full => write!(f, "full"),
            CleaningMode::SentencesOnly => write!(f, "sentences_only"),
        }
    }
}

/// Turn a raw caption or ASR transcript into deduplicated, sentence-joined text.
///
/// Pure and deterministic. Running it again on its own output keeps the same
/// sentences.
pub fn clean_transcript(text: &str, mode: CleaningMode) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = match mode {
        CleaningMode::Full => repetition::clean_repeated_phrases(text),
        CleaningMode::SentencesOnly => text.to_string(),
    };

    let sentences = split_into_sentences(&text);
    let sentences = repetition::remove_duplicate_sentences(sentences);
    let sentences = repetition::remove_self_echoes(sentences);

    sentences.join(". ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_transcript("", CleaningMode::Full), "");
        assert_eq!(clean_transcript("", CleaningMode::SentencesOnly), "");
    }

    #[test]
    fn test_duplicate_sentences_appear_once_in_order() {
        let raw = "First point. Second point! First point. Third point? Second point.";
        for mode in [CleaningMode::Full, CleaningMode::SentencesOnly] {
            assert_eq!(
                clean_transcript(raw, mode),
                "First point. Second point. Third point"
            );
        }
    }

    #[test]
    fn test_self_echo_sentence_is_halved() {
        let w = "This Is The Part Where We Start";
        let raw = format!("{} {}", w, w);
        assert_eq!(
            clean_transcript(&raw, CleaningMode::SentencesOnly),
            normalize_text(w)
        );
    }

    #[test]
    fn test_long_self_echo_is_halved_in_full_mode() {
        // Longer than the widest repeated-segment window, so the echo pass sees it
        let w = "This Is Where We Start Building A Small Parser From Scratch Today";
        let raw = format!("{} {}", w, w);
        assert_eq!(clean_transcript(&raw, CleaningMode::Full), normalize_text(w));
    }

    #[test]
    fn test_full_mode_removes_stutter_and_loops() {
        let raw = "so so today we we are going to to build build a parser a parser";
        assert_eq!(
            clean_transcript(raw, CleaningMode::Full),
            "so today we are going to build a parser"
        );
    }

    #[test]
    fn test_sentences_only_keeps_word_stutter() {
        let raw = "the the cat sat.";
        assert_eq!(clean_transcript(raw, CleaningMode::SentencesOnly), "the the cat sat");
        assert_eq!(clean_transcript(raw, CleaningMode::Full), "the cat sat");
    }

    #[test]
    fn test_korean_caption_in_full_mode() {
        assert_eq!(clean_transcript("안녕 안녕 반가워요", CleaningMode::Full), "안녕 반가워요");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let inputs = [
            "Hello everyone and welcome hello everyone and welcome. \
             We will cover three things. We will cover three things. \
             First first the setup! Then the code?",
            "Hello world foo bar. Hello world foo bar hello world foo bar",
        ];
        for raw in inputs {
            for mode in [CleaningMode::Full, CleaningMode::SentencesOnly] {
                let once = clean_transcript(raw, mode);
                let twice = clean_transcript(&once, mode);
                assert_eq!(split_into_sentences(&once), split_into_sentences(&twice), "{:?}", raw);
            }
        }
    }

    #[test]
    fn test_echo_of_earlier_sentence_appears_once() {
        let raw = "Hello world foo bar. Hello world foo bar hello world foo bar";
        for mode in [CleaningMode::Full, CleaningMode::SentencesOnly] {
            assert_eq!(clean_transcript(raw, mode), "Hello world foo bar");
        }
    }
}
