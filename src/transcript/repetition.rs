//! Detectors for the repetition artifacts found in auto-generated captions and
//! speech-to-text output: stutter (`the the`), phrase loops (`a b a b a b`) and
//! half-sentence echoes left behind by scrolling captions.

use std::collections::HashSet;

use super::normalize::normalize_text;

const MIN_ECHO_WORDS: usize = 6;
const MIN_ECHO_HALF_CHARS: usize = 10;
const MAX_SEGMENT_WINDOW: usize = 10;
const MAX_TRIPLE_PATTERN: usize = 15;

/// Keep the first occurrence of every sentence, preserving order.
pub fn remove_duplicate_sentences(sentences: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    sentences
        .into_iter()
        .filter(|sentence| seen.insert(sentence.clone()))
        .collect()
}

/// Returns the normalized first half when `sentence` echoes itself.
fn echoed_first_half(sentence: &str) -> Option<String> {
    let normalized = normalize_text(sentence);
    let words: Vec<&str> = normalized.split(' ').collect();

    if words.len() <= MIN_ECHO_WORDS {
        return None;
    }

    let mid = words.len() / 2;
    let first_half = words[..mid].join(" ");
    let second_half = words[mid..].join(" ");

    if first_half.chars().count() > MIN_ECHO_HALF_CHARS && second_half.contains(&first_half) {
        Some(first_half)
    } else {
        None
    }
}

/// Replace self-echoing sentences with their first half and drop sentences
/// whose normalized form was already emitted.
pub fn remove_self_echoes(sentences: Vec<String>) -> Vec<String> {
    let mut cleaned = Vec::with_capacity(sentences.len());
    let mut seen = HashSet::new();

    for sentence in sentences {
        let normalized = normalize_text(&sentence);
        if seen.contains(&normalized) {
            continue;
        }

        match echoed_first_half(&sentence) {
            Some(half) => {
                if seen.insert(normalize_text(&half)) {
                    cleaned.push(half);
                }
            }
            None => {
                seen.insert(normalized);
                cleaned.push(sentence);
            }
        }
    }

    cleaned
}

/// Collapse adjacent identical words into one.
pub fn remove_consecutive_words<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut result: Vec<&str> = Vec::with_capacity(words.len());
    for &word in words {
        if result.last() != Some(&word) {
            result.push(word);
        }
    }
    result
}

/// For each window length from 2 to 10, drop the second of two equal
/// adjacent windows until none remain at that length.
pub fn remove_repeating_segments<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut result = words.to_vec();

    for len in 2..=MAX_SEGMENT_WINDOW {
        while let Some(i) = find_adjacent_repeat(&result, len) {
            result.drain(i + len..i + 2 * len);
        }
    }

    result
}

fn find_adjacent_repeat(words: &[&str], len: usize) -> Option<usize> {
    if words.len() < len * 2 {
        return None;
    }
    (0..=words.len() - len * 2).find(|&i| words[i..i + len] == words[i + len..i + 2 * len])
}

/// For each pattern length from 1 to 15, collapse the first `A A A` triple
/// found to a single `A`. One removal per length.
pub fn remove_triple_repeats<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut result = words.to_vec();

    for len in 1..=MAX_TRIPLE_PATTERN {
        if result.len() < len * 3 {
            continue;
        }
        let found = (0..=result.len() - len * 3).find(|&i| {
            let first = &result[i..i + len];
            first == &result[i + len..i + 2 * len] && first == &result[i + 2 * len..i + 3 * len]
        });
        if let Some(i) = found {
            result.drain(i + len..i + 3 * len);
        }
    }

    result
}

/// Word-level cleanup: stutter, repeated segments, triple loops, stutter again.
pub fn clean_repeated_phrases(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();

    let words = remove_consecutive_words(&words);
    let words = remove_repeating_segments(&words);
    let words = remove_triple_repeats(&words);
    let words = remove_consecutive_words(&words);

    words.join(" ")
}
