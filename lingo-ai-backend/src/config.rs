use anyhow::Context;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CEFR_MODEL: &str = "gpt-4o-mini-2024-07-18";
const DEFAULT_VERB_MODEL: &str = "gpt-4o";

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub service_role_key: String,
}

/// Everything the server reads from its environment, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Model for CEFR rewrites.
    pub cefr_model: String,
    /// Model for language detection, verb extraction and conjugation.
    pub verb_model: String,
    /// Where the completion cache lives. `None` keeps it in process memory.
    pub supabase: Option<SupabaseConfig>,
    pub bind_addr: String,
    /// Shortest trimmed sentence, in characters, that detection will look at.
    pub min_sentence_chars: usize,
    pub cefr_cache_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let openai_api_key = var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;

        let supabase = match (var("SUPABASE_URL"), var("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(supabase_url), Some(service_role_key)) => Some(SupabaseConfig {
                supabase_url: supabase_url.trim_end_matches('/').to_string(),
                service_role_key,
            }),
            (None, None) => None,
            _ => anyhow::bail!("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set together"),
        };

        let min_sentence_chars = match var("MIN_SENTENCE_CHARS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("MIN_SENTENCE_CHARS is not a number: {value}"))?,
            None => 3,
        };

        let ttl_days: i64 = match var("CEFR_CACHE_TTL_DAYS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("CEFR_CACHE_TTL_DAYS is not a number: {value}"))?,
            None => 30,
        };
        let cefr_cache_ttl = chrono::TimeDelta::try_days(ttl_days)
            .filter(|ttl| *ttl > chrono::TimeDelta::zero())
            .with_context(|| {
                format!("CEFR_CACHE_TTL_DAYS must be a positive day count: {ttl_days}")
            })?;

        Ok(Self {
            openai_api_key,
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            cefr_model: var("OPENAI_CEFR_MODEL").unwrap_or_else(|| DEFAULT_CEFR_MODEL.to_string()),
            verb_model: var("OPENAI_VERB_MODEL").unwrap_or_else(|| DEFAULT_VERB_MODEL.to_string()),
            supabase,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            min_sentence_chars,
            cefr_cache_ttl,
        })
    }
}
