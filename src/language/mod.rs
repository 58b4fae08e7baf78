use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the extractor knows how to prioritize
///
/// Declaration order is detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Ko,
    Ja,
    Zh,
    Th,
    Ar,
    Hi,
    Ru,
    El,
    En,
    Es,
    Fr,
}

/// Fallback order when the metadata gives no script hint.
pub const DEFAULT_PRIORITY: [LanguageCode; 4] =
    [LanguageCode::En, LanguageCode::Ko, LanguageCode::Ja, LanguageCode::Zh];

/// Broad list used for caption lookup when no metadata is available at all.
pub const BROAD_PRIORITY: [LanguageCode; 6] = [
    LanguageCode::En,
    LanguageCode::Ko,
    LanguageCode::Ja,
    LanguageCode::Zh,
    LanguageCode::Es,
    LanguageCode::Fr,
];

static SCRIPT_PATTERNS: Lazy<Vec<(LanguageCode, Regex)>> = Lazy::new(|| {
    LanguageCode::ALL
        .iter()
        .filter_map(|lang| {
            lang.script_range()
                .map(|range| (*lang, Regex::new(range).expect("valid script range")))
        })
        .collect()
});

impl LanguageCode {
    pub const ALL: [LanguageCode; 11] = [
        LanguageCode::Ko,
        LanguageCode::Ja,
        LanguageCode::Zh,
        LanguageCode::Th,
        LanguageCode::Ar,
        LanguageCode::Hi,
        LanguageCode::Ru,
        LanguageCode::El,
        LanguageCode::En,
        LanguageCode::Es,
        LanguageCode::Fr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Ko => "ko",
            LanguageCode::Ja => "ja",
            LanguageCode::Zh => "zh",
            LanguageCode::Th => "th",
            LanguageCode::Ar => "ar",
            LanguageCode::Hi => "hi",
            LanguageCode::Ru => "ru",
            LanguageCode::El => "el",
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
        }
    }

    /// English name as printed by the speech-to-text engine
    pub fn english_name(&self) -> &'static str {
        match self {
            LanguageCode::Ko => "korean",
            LanguageCode::Ja => "japanese",
            LanguageCode::Zh => "chinese",
            LanguageCode::Th => "thai",
            LanguageCode::Ar => "arabic",
            LanguageCode::Hi => "hindi",
            LanguageCode::Ru => "russian",
            LanguageCode::El => "greek",
            LanguageCode::En => "english",
            LanguageCode::Es => "spanish",
            LanguageCode::Fr => "french",
        }
    }

    /// Regional variants requested from the caption source
    pub fn regional_variants(&self) -> &'static [&'static str] {
        match self {
            LanguageCode::Ko => &["ko", "kr"],
            LanguageCode::Ja => &["ja", "jp"],
            LanguageCode::Zh => &["zh", "zh-CN", "zh-TW", "zh-Hans", "zh-Hant"],
            LanguageCode::En => &["en", "en-US", "en-GB"],
            LanguageCode::Th => &["th"],
            LanguageCode::Ar => &["ar"],
            LanguageCode::Hi => &["hi"],
            LanguageCode::Ru => &["ru"],
            LanguageCode::El => &["el"],
            LanguageCode::Es => &["es"],
            LanguageCode::Fr => &["fr"],
        }
    }

    /// Unicode character class identifying the script, if the language has one
    fn script_range(&self) -> Option<&'static str> {
        match self {
            LanguageCode::Ko => Some(r"[\u{3131}-\u{3163}\u{AC00}-\u{D7A3}]"),
            LanguageCode::Ja => Some(r"[\u{3040}-\u{309F}\u{30A0}-\u{30FF}]"),
            LanguageCode::Zh => Some(r"[\u{4E00}-\u{9FFF}]"),
            LanguageCode::Th => Some(r"[\u{0E00}-\u{0E7F}]"),
            LanguageCode::Ar => Some(r"[\u{0600}-\u{06FF}]"),
            LanguageCode::Hi => Some(r"[\u{0900}-\u{097F}]"),
            LanguageCode::Ru => Some(r"[\u{0400}-\u{04FF}]"),
            LanguageCode::El => Some(r"[\u{0370}-\u{03FF}]"),
            LanguageCode::En | LanguageCode::Es | LanguageCode::Fr => None,
        }
    }

    /// Scripts that get the smaller, more careful speech-to-text model
    pub fn is_complex_script(&self) -> bool {
        matches!(
            self,
            LanguageCode::Zh
                | LanguageCode::Ja
                | LanguageCode::Ko
                | LanguageCode::Ar
                | LanguageCode::Hi
                | LanguageCode::Th
        )
    }

    /// Languages whose audio is extracted at the higher bitrate tier
    pub fn needs_high_quality_audio(&self) -> bool {
        matches!(self, LanguageCode::Ja | LanguageCode::Ko | LanguageCode::Zh)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    /// Accepts a code (`ja`), a regional variant (`zh-TW`) or an English name (`Japanese`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        LanguageCode::ALL
            .iter()
            .find(|lang| {
                lang.as_str() == lower
                    || lang.english_name() == lower
                    || lang
                        .regional_variants()
                        .iter()
                        .any(|variant| variant.to_lowercase() == lower)
            })
            .copied()
            .ok_or_else(|| format!("Unsupported language: {}", s))
    }
}

/// Textual video metadata used to guess the spoken language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VideoMetadata {
    fn text_blob(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            self.uploader.as_deref().unwrap_or(""),
            self.tags.join(" ")
        )
    }
}

/// Languages whose script appears in the metadata, in declaration order.
pub fn detect_script_languages(metadata: &VideoMetadata) -> Vec<LanguageCode> {
    let blob = metadata.text_blob();
    SCRIPT_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&blob))
        .map(|(lang, _)| *lang)
        .collect()
}

/// Priority-ordered language candidates for a video. Never empty.
pub fn detect_video_language(metadata: &VideoMetadata) -> Vec<LanguageCode> {
    let mut detected = detect_script_languages(metadata);

    if detected.is_empty() {
        return DEFAULT_PRIORITY.to_vec();
    }

    for lang in DEFAULT_PRIORITY {
        if !detected.contains(&lang) {
            detected.push(lang);
        }
    }
    detected
}

/// Flatten languages into the deduplicated list of caption codes to request.
pub fn expand_language_codes(languages: &[LanguageCode]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::new();
    for variant in languages.iter().flat_map(|lang| lang.regional_variants()) {
        if !expanded.iter().any(|existing| existing == variant) {
            expanded.push(variant.to_string());
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> VideoMetadata {
        VideoMetadata {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_hangul_title_puts_korean_first() {
        let detected = detect_video_language(&titled("안녕하세요"));
        assert_eq!(
            detected,
            vec![LanguageCode::Ko, LanguageCode::En, LanguageCode::Ja, LanguageCode::Zh]
        );
    }

    #[test]
    fn test_latin_metadata_returns_default_priority() {
        let detected = detect_video_language(&titled("Rust in 100 seconds"));
        assert_eq!(detected, DEFAULT_PRIORITY.to_vec());
        assert_eq!(detect_video_language(&VideoMetadata::default()), DEFAULT_PRIORITY.to_vec());
    }

    #[test]
    fn test_multiple_scripts_keep_declaration_order() {
        let metadata = VideoMetadata {
            title: Some("Привет".to_string()),
            description: Some("ひらがな and 漢字".to_string()),
            uploader: None,
            tags: vec!["ไทย".to_string()],
        };
        assert_eq!(
            detect_video_language(&metadata),
            vec![
                LanguageCode::Ja,
                LanguageCode::Zh,
                LanguageCode::Th,
                LanguageCode::Ru,
                LanguageCode::En,
                LanguageCode::Ko,
            ]
        );
    }

    #[test]
    fn test_tags_and_uploader_are_searched() {
        let metadata = VideoMetadata {
            uploader: Some("قناة".to_string()),
            tags: vec!["Ελληνικά".to_string()],
            ..Default::default()
        };
        assert_eq!(
            detect_script_languages(&metadata),
            vec![LanguageCode::Ar, LanguageCode::El]
        );
    }

    #[test]
    fn test_expand_language_codes() {
        assert_eq!(
            expand_language_codes(&[LanguageCode::Zh, LanguageCode::En]),
            vec!["zh", "zh-CN", "zh-TW", "zh-Hans", "zh-Hant", "en", "en-US", "en-GB"]
        );
        assert_eq!(expand_language_codes(&[LanguageCode::Ko, LanguageCode::Ko]), vec!["ko", "kr"]);
    }

    #[test]
    fn test_parse_language_code() {
        assert_eq!("ja".parse::<LanguageCode>(), Ok(LanguageCode::Ja));
        assert_eq!("Japanese".parse::<LanguageCode>(), Ok(LanguageCode::Ja));
        assert_eq!("zh-TW".parse::<LanguageCode>(), Ok(LanguageCode::Zh));
        assert!("klingon".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn test_model_and_audio_tiers() {
        assert!(LanguageCode::Th.is_complex_script());
        assert!(!LanguageCode::Ru.is_complex_script());
        assert!(LanguageCode::Ko.needs_high_quality_audio());
        assert!(!LanguageCode::Ar.needs_high_quality_audio());
    }
}
