use std::path::PathBuf;

use crate::error::EnrichError;

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";
const DEFAULT_CACHE_PATH: &str = "lingo-verb-cache.json";

/// Endpoints and credentials for the client, read once at startup.
///
/// Anything missing stays `None` and is reported by the adapter that needs it.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub detect_language_url: Option<String>,
    pub analyze_verbs_url: Option<String>,
    pub conjugate_verb_url: Option<String>,
    pub cefr_url: Option<String>,
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,
    pub cache_path: PathBuf,
    pub min_sentence_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, EnrichError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnrichError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let min_sentence_chars = match var("MIN_SENTENCE_CHARS") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| {
                    EnrichError::Configuration(format!("MIN_SENTENCE_CHARS is not a number: {value}"))
                })?,
            None => 5,
        };

        Ok(Self {
            supabase_url: var("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            supabase_anon_key: var("SUPABASE_ANON_KEY"),
            detect_language_url: var("DETECT_LANGUAGE_URL"),
            analyze_verbs_url: var("ANALYZE_VERBS_URL"),
            conjugate_verb_url: var("CONJUGATE_VERB_URL"),
            cefr_url: var("CEFR_URL"),
            deepl_api_key: var("DEEPL_API_KEY"),
            deepl_api_url: var("DEEPL_API_URL").unwrap_or_else(|| DEFAULT_DEEPL_API_URL.to_string()),
            cache_path: var("LINGO_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            min_sentence_chars,
        })
    }

    pub(crate) fn anon_key(&self) -> Result<&str, EnrichError> {
        self.supabase_anon_key
            .as_deref()
            .ok_or_else(|| EnrichError::missing("SUPABASE_ANON_KEY"))
    }
}
