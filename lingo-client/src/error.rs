/// Errors surfaced by the client-side adapters and the enrichment pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("Input is too short for language detection (minimum {min_chars} characters)")]
    InputTooShort { min_chars: usize },

    #[error("Language must be specified for verb analysis")]
    UnknownLanguage,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to parse {what}: {message}")]
    ProviderParse { what: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{what} failed with {status}: {body}")]
    Upstream {
        what: &'static str,
        status: u16,
        body: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EnrichError {
    pub(crate) fn missing(key: &str) -> Self {
        EnrichError::Configuration(format!("{key} not set"))
    }
}

impl From<std::io::Error> for EnrichError {
    fn from(e: std::io::Error) -> Self {
        EnrichError::Storage(e.to_string())
    }
}
