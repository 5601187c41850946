//! Verb analysis records and the request/response bodies of the verb endpoints.

use serde::{Deserialize, Serialize};

use crate::LanguageTag;

/// One verb form found in an analyzed sentence.
///
/// The grammatical tags use whatever vocabulary the provider answers with;
/// nothing here validates them. Only `infinitive` is required. Keys this type
/// does not name are kept in `extra` so the record serializes back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct VerbOccurrence {
    pub infinitive: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A full conjugation table for one lemma.
///
/// `conjugation` maps mood or tense names to nested tables whose shape depends
/// on the language template, so it stays an untyped JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConjugationRecord {
    pub infinitive: String,
    pub language: String,
    pub conjugation: serde_json::Map<String, serde_json::Value>,
}

impl ConjugationRecord {
    /// All three top-level fields are present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.infinitive.trim().is_empty()
            && !self.language.trim().is_empty()
            && !self.conjugation.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectLanguageRequest {
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectLanguageResponse {
    #[serde(default = "LanguageTag::unknown")]
    pub language: LanguageTag,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeVerbsRequest {
    pub sentence: String,
    pub language: LanguageTag,
}

/// `{ "verbs": [...] }`. A missing array means no verbs were found.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct AnalyzeVerbsResponse {
    #[serde(default)]
    pub verbs: Vec<VerbOccurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConjugateVerbRequest {
    pub infinitive: String,
    pub language: LanguageTag,
}
