pub mod cefr;
pub mod detection;
pub mod text_cleanup;
pub mod translation;
pub mod verbs;

pub use cefr::{CefrAnalysis, CefrLevel, CefrRequest, CefrResponse, CefrResult};
pub use verbs::{
    AnalyzeVerbsRequest, AnalyzeVerbsResponse, ConjugateVerbRequest, ConjugationRecord,
    DetectLanguageRequest, DetectLanguageResponse, VerbOccurrence,
};

/// Body of every non-2xx response from the AI backend.
///
/// `raw` carries unparsable provider output so callers can diagnose it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Hash,
    PartialEq,
    Eq,
    Ord,
    PartialOrd,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    French,
    English,
    Spanish,
    Korean,
    German,
    Chinese,
    Japanese,
    Russian,
    Portuguese,
    Italian,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WritingSystem {
    /// Latin alphabet (Romance languages, Germanic languages, etc.)
    Latin,
    /// Korean Hangul script
    Hangul,
    /// Cyrillic alphabet (Russian, etc.)
    Cyrillic,
    /// Chinese Han characters (simplified and traditional)
    Han,
    /// Japanese writing system (combines Kanji, Hiragana, and Katakana)
    Japanese,
}

impl Language {
    pub fn iso_639_3(&self) -> &'static str {
        match self {
            Language::French => "fra",
            Language::English => "eng",
            Language::Spanish => "spa",
            Language::Korean => "kor",
            Language::German => "deu",
            Language::Chinese => "cmn",
            Language::Japanese => "jpn",
            Language::Russian => "rus",
            Language::Portuguese => "por",
            Language::Italian => "ita",
        }
    }

    pub fn iso_639_1(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
            Language::Spanish => "es",
            Language::Korean => "ko",
            Language::German => "de",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Russian => "ru",
            Language::Portuguese => "pt",
            Language::Italian => "it",
        }
    }

    /// The lowercase name used as a language tag on the wire and in cache keys.
    pub fn name(&self) -> &'static str {
        match self {
            Language::French => "french",
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::Korean => "korean",
            Language::German => "german",
            Language::Chinese => "chinese",
            Language::Japanese => "japanese",
            Language::Russian => "russian",
            Language::Portuguese => "portuguese",
            Language::Italian => "italian",
        }
    }

    /// Case-insensitive lookup by lowercase name (`"italian"`) or ISO 639-3 code (`"ita"`).
    pub fn from_name(name: &str) -> Option<Language> {
        let name = name.trim().to_lowercase();
        LANGUAGES
            .iter()
            .copied()
            .find(|language| language.name() == name || language.iso_639_3() == name)
    }

    pub fn writing_system(&self) -> WritingSystem {
        match self {
            Language::French
            | Language::English
            | Language::Spanish
            | Language::German
            | Language::Portuguese
            | Language::Italian => WritingSystem::Latin,
            Language::Korean => WritingSystem::Hangul,
            Language::Russian => WritingSystem::Cyrillic,
            Language::Chinese => WritingSystem::Han,
            Language::Japanese => WritingSystem::Japanese,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::French => write!(f, "French"),
            Language::English => write!(f, "English"),
            Language::Spanish => write!(f, "Spanish"),
            Language::Korean => write!(f, "Korean"),
            Language::German => write!(f, "German"),
            Language::Chinese => write!(f, "Chinese"),
            Language::Japanese => write!(f, "Japanese"),
            Language::Russian => write!(f, "Russian"),
            Language::Portuguese => write!(f, "Portuguese"),
            Language::Italian => write!(f, "Italian"),
        }
    }
}

pub const LANGUAGES: &[Language] = &[
    Language::French,
    Language::Spanish,
    Language::English,
    Language::Korean,
    Language::German,
    Language::Chinese,
    Language::Japanese,
    Language::Russian,
    Language::Portuguese,
    Language::Italian,
];

/// A detected language as it travels between services.
///
/// Detection can name languages outside [`Language`] (the LLM fallback answers
/// with any lowercase name), so the tag is kept as a string. The literal
/// `"unknown"` means detection failed and nothing downstream may proceed.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(from = "String", into = "String")]
pub struct LanguageTag(String);

impl LanguageTag {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into().trim().to_lowercase();
        if tag.is_empty() {
            Self::unknown()
        } else {
            Self(tag)
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The supported language this tag names, if any.
    pub fn language(&self) -> Option<Language> {
        Language::from_name(&self.0)
    }
}

impl From<Language> for LanguageTag {
    fn from(language: Language) -> Self {
        Self(language.name().to_string())
    }
}

impl From<String> for LanguageTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.0
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
