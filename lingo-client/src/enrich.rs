//! Verb enrichment: detect, extract, then resolve each verb through the caches.

use std::sync::Arc;

use async_trait::async_trait;
use language_utils::{ConjugationRecord, LanguageTag, VerbOccurrence};
use serde::{Deserialize, Serialize};

use crate::cache::{ConjugationStore, VerbAnalysisCache};
use crate::error::EnrichError;

/// Tag written alongside freshly generated conjugation tables.
pub const CONJUGATION_SOURCE: &str = "openai";

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, sentence: &str) -> Result<LanguageTag, EnrichError>;
}

#[async_trait]
pub trait VerbExtractor: Send + Sync {
    async fn extract_verbs(
        &self,
        sentence: &str,
        language: &LanguageTag,
    ) -> Result<Vec<VerbOccurrence>, EnrichError>;
}

#[async_trait]
pub trait ConjugationResolver: Send + Sync {
    async fn conjugate(
        &self,
        infinitive: &str,
        language: &LanguageTag,
    ) -> Result<ConjugationRecord, EnrichError>;
}

/// What [`VerbEnricher::enrich`] returns.
///
/// `results` holds one cached-or-fresh analysis per extracted verb, in
/// sentence order. Cached entries are returned as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerbData {
    pub language: LanguageTag,
    pub results: Vec<serde_json::Value>,
}

pub struct VerbEnricher {
    detector: Arc<dyn LanguageDetector>,
    extractor: Arc<dyn VerbExtractor>,
    conjugator: Arc<dyn ConjugationResolver>,
    local: Arc<dyn VerbAnalysisCache>,
    remote: Arc<dyn VerbAnalysisCache>,
    conjugations: Arc<dyn ConjugationStore>,
}

impl VerbEnricher {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        extractor: Arc<dyn VerbExtractor>,
        conjugator: Arc<dyn ConjugationResolver>,
        local: Arc<dyn VerbAnalysisCache>,
        remote: Arc<dyn VerbAnalysisCache>,
        conjugations: Arc<dyn ConjugationStore>,
    ) -> Self {
        Self {
            detector,
            extractor,
            conjugator,
            local,
            remote,
            conjugations,
        }
    }

    pub async fn enrich(&self, sentence: &str) -> Result<VerbData, EnrichError> {
        let language = self.detector.detect(sentence).await?;
        let verbs = self.extractor.extract_verbs(sentence, &language).await?;
        if verbs.is_empty() {
            log::warn!("No verbs found in the sentence: {sentence}");
            return Ok(VerbData {
                language,
                results: Vec::new(),
            });
        }

        let mut results = Vec::with_capacity(verbs.len());
        for verb in verbs {
            let infinitive = verb.infinitive.to_lowercase();
            let entry = self.resolve(&infinitive, &language, verb).await?;
            results.push(entry);
        }

        Ok(VerbData { language, results })
    }

    async fn resolve(
        &self,
        infinitive: &str,
        language: &LanguageTag,
        verb: VerbOccurrence,
    ) -> Result<serde_json::Value, EnrichError> {
        if let Some(cached) = self.local.get(infinitive, language).await {
            log::info!("Found cached verb data for {infinitive} in {language}");
            return Ok(cached);
        }

        if let Some(cached) = self.remote.get(infinitive, language).await {
            self.local.set(infinitive, language, &cached).await?;
            log::info!("Found cached verb analysis for {infinitive} in {language} remotely");
            return Ok(cached);
        }

        let analysis =
            serde_json::to_value(&verb).map_err(|e| EnrichError::Storage(e.to_string()))?;
        self.local.set(infinitive, language, &analysis).await?;
        // Analysis must be stored before its conjugation.
        if let Err(e) = self.remote.set(infinitive, language, &analysis).await {
            log::warn!("Failed to store verb analysis for {infinitive} remotely: {e}");
        }
        log::info!("Saved verb analysis for {infinitive} in {language}");

        let record = self.conjugator.conjugate(infinitive, language).await?;
        log::debug!("Conjugation for {infinitive}: {:?}", record.conjugation);
        let record = ConjugationRecord {
            infinitive: infinitive.to_string(),
            language: language.to_string(),
            conjugation: record.conjugation,
        };
        self.conjugations
            .upsert_conjugation(&record, CONJUGATION_SOURCE)
            .await?;

        Ok(analysis)
    }
}
