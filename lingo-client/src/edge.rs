//! HTTP adapters for the backend's language, verb and conjugation endpoints.

use async_trait::async_trait;
use language_utils::{
    AnalyzeVerbsRequest, AnalyzeVerbsResponse, ConjugateVerbRequest, ConjugationRecord,
    DetectLanguageRequest, DetectLanguageResponse, Language, LanguageTag, VerbOccurrence,
    text_cleanup::strip_code_fences,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::enrich::{ConjugationResolver, LanguageDetector, VerbExtractor};
use crate::error::EnrichError;

/// Calls the deployed endpoints with the public anon key as bearer token.
#[derive(Clone)]
pub struct EdgeClient {
    client: reqwest::Client,
    config: Config,
}

impl EdgeClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) async fn post_json<B, R>(
        &self,
        what: &'static str,
        url: Option<&str>,
        url_key: &str,
        body: &B,
    ) -> Result<R, EnrichError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = url.ok_or_else(|| EnrichError::missing(url_key))?;
        let anon_key = self.config.anon_key()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(anon_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            log::error!("{what} error: {text}");
            return Err(EnrichError::Upstream {
                what,
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(strip_code_fences(&text)).map_err(|e| {
            log::error!("Unexpected {what} response: {text}");
            EnrichError::ProviderParse {
                what,
                message: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl LanguageDetector for EdgeClient {
    async fn detect(&self, sentence: &str) -> Result<LanguageTag, EnrichError> {
        let min_chars = self.config.min_sentence_chars;
        if sentence.trim().chars().count() < min_chars {
            return Err(EnrichError::InputTooShort { min_chars });
        }

        let response: DetectLanguageResponse = self
            .post_json(
                "Detect language",
                self.config.detect_language_url.as_deref(),
                "DETECT_LANGUAGE_URL",
                &DetectLanguageRequest {
                    sentence: sentence.to_string(),
                },
            )
            .await?;

        log::info!("Detected language: {}", response.language);
        Ok(response.language)
    }
}

#[async_trait]
impl VerbExtractor for EdgeClient {
    async fn extract_verbs(
        &self,
        sentence: &str,
        language: &LanguageTag,
    ) -> Result<Vec<VerbOccurrence>, EnrichError> {
        if language.is_unknown() {
            log::error!("Language is unknown, cannot analyze verbs");
            return Err(EnrichError::UnknownLanguage);
        }

        let response: AnalyzeVerbsResponse = self
            .post_json(
                "Analyze verbs",
                self.config.analyze_verbs_url.as_deref(),
                "ANALYZE_VERBS_URL",
                &AnalyzeVerbsRequest {
                    sentence: sentence.to_string(),
                    language: language.clone(),
                },
            )
            .await?;
        Ok(response.verbs)
    }
}

#[async_trait]
impl ConjugationResolver for EdgeClient {
    async fn conjugate(
        &self,
        infinitive: &str,
        language: &LanguageTag,
    ) -> Result<ConjugationRecord, EnrichError> {
        if Language::from_name(language.as_str()).is_none() {
            return Err(EnrichError::UnsupportedLanguage(language.to_string()));
        }

        let record: ConjugationRecord = self
            .post_json(
                "Conjugate verb",
                self.config.conjugate_verb_url.as_deref(),
                "CONJUGATE_VERB_URL",
                &ConjugateVerbRequest {
                    infinitive: infinitive.to_string(),
                    language: language.clone(),
                },
            )
            .await?;

        if !record.is_complete() {
            log::error!("Unexpected conjugate-verb response format: {record:?}");
            return Err(EnrichError::ProviderParse {
                what: "Conjugate verb",
                message: "missing infinitive, language or conjugation".to_string(),
            });
        }
        Ok(record)
    }
}
