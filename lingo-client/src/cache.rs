//! The two verb-analysis cache tiers and the conjugation table.
//!
//! Both tiers key entries by `(infinitive lowercased, language)` and treat the
//! stored analysis as opaque JSON. Writes replace the previous value whole.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use language_utils::{ConjugationRecord, LanguageTag};
use postgrest::Postgrest;
use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// One tier of the verb-analysis cache.
#[async_trait]
pub trait VerbAnalysisCache: Send + Sync {
    /// Look up the analysis for `infinitive`. Backend failures read as a miss.
    async fn get(&self, infinitive: &str, language: &LanguageTag) -> Option<serde_json::Value>;

    async fn set(
        &self,
        infinitive: &str,
        language: &LanguageTag,
        analysis: &serde_json::Value,
    ) -> Result<(), EnrichError>;
}

/// Somewhere to upsert full conjugation tables.
#[async_trait]
pub trait ConjugationStore: Send + Sync {
    async fn upsert_conjugation(
        &self,
        record: &ConjugationRecord,
        source: &str,
    ) -> Result<(), EnrichError>;
}

pub fn local_key(infinitive: &str, language: &LanguageTag) -> String {
    format!("verb:{language}:{}", infinitive.to_lowercase())
}

/// On-device tier: an in-memory map mirrored to a JSON file.
pub struct LocalVerbCache {
    entries: DashMap<String, serde_json::Value>,
    path: PathBuf,
}

impl LocalVerbCache {
    /// Open the cache at `path`, starting empty if the file is missing or does
    /// not hold a JSON object. I/O errors other than a missing file are returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EnrichError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let entries: DashMap<String, serde_json::Value> = if path.exists() {
            let content = std::fs::read(&path)?;
            serde_json::from_slice(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt verb cache at {}: {e}", path.display());
                DashMap::new()
            })
        } else {
            DashMap::new()
        };
        log::info!(
            "Loaded {} cached verbs from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries, path })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), EnrichError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| EnrichError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl VerbAnalysisCache for LocalVerbCache {
    async fn get(&self, infinitive: &str, language: &LanguageTag) -> Option<serde_json::Value> {
        self.entries
            .get(&local_key(infinitive, language))
            .map(|entry| entry.value().clone())
    }

    async fn set(
        &self,
        infinitive: &str,
        language: &LanguageTag,
        analysis: &serde_json::Value,
    ) -> Result<(), EnrichError> {
        self.entries
            .insert(local_key(infinitive, language), analysis.clone());
        self.persist()
    }
}

#[derive(Serialize)]
struct VerbAnalysisRow<'a> {
    infinitive: String,
    language: &'a str,
    analysis: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct AnalysisColumn {
    analysis: serde_json::Value,
}

#[derive(Serialize)]
struct ConjugationRow<'a> {
    infinitive: &'a str,
    language: &'a str,
    conjugation: &'a serde_json::Map<String, serde_json::Value>,
    source: &'a str,
}

/// Remote tier: the `verb_analysis` and `verb_conjugations` tables.
pub struct SupabaseVerbStore {
    client: Postgrest,
}

impl SupabaseVerbStore {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        let client = Postgrest::new(format!("{supabase_url}/rest/v1"))
            .insert_header("apikey", anon_key)
            .insert_header("Authorization", format!("Bearer {anon_key}"));
        Self { client }
    }

    async fn fetch_analysis(
        &self,
        infinitive: &str,
        language: &LanguageTag,
    ) -> Result<Option<serde_json::Value>, EnrichError> {
        let response = self
            .client
            .from("verb_analysis")
            .select("analysis")
            .eq("infinitive", infinitive.to_lowercase())
            .eq("language", language.as_str())
            .execute()
            .await
            .map_err(|e| EnrichError::Storage(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| EnrichError::Storage(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(EnrichError::Storage(format!(
                "verb_analysis read returned {status}: {body}"
            )));
        }

        let rows: Vec<AnalysisColumn> =
            serde_json::from_str(&body).map_err(|e| EnrichError::Storage(e.to_string()))?;
        Ok(rows.into_iter().next().map(|row| row.analysis))
    }

    async fn upsert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
        on_conflict: &str,
    ) -> Result<(), EnrichError> {
        let body = serde_json::to_string(row).map_err(|e| EnrichError::Storage(e.to_string()))?;
        let response = self
            .client
            .from(table)
            .upsert(body)
            .on_conflict(on_conflict)
            .execute()
            .await
            .map_err(|e| EnrichError::Storage(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::Storage(format!(
                "{table} upsert returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VerbAnalysisCache for SupabaseVerbStore {
    async fn get(&self, infinitive: &str, language: &LanguageTag) -> Option<serde_json::Value> {
        match self.fetch_analysis(infinitive, language).await {
            Ok(analysis) => analysis,
            Err(e) => {
                log::warn!("Remote verb cache read failed for {infinitive}: {e}");
                None
            }
        }
    }

    async fn set(
        &self,
        infinitive: &str,
        language: &LanguageTag,
        analysis: &serde_json::Value,
    ) -> Result<(), EnrichError> {
        let row = VerbAnalysisRow {
            infinitive: infinitive.to_lowercase(),
            language: language.as_str(),
            analysis,
        };
        self.upsert("verb_analysis", &row, "infinitive,language")
            .await
    }
}

#[async_trait]
impl ConjugationStore for SupabaseVerbStore {
    async fn upsert_conjugation(
        &self,
        record: &ConjugationRecord,
        source: &str,
    ) -> Result<(), EnrichError> {
        let row = ConjugationRow {
            infinitive: &record.infinitive,
            language: &record.language,
            conjugation: &record.conjugation,
            source,
        };
        self.upsert("verb_conjugations", &[row], "infinitive,language")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn italian() -> LanguageTag {
        LanguageTag::new("italian")
    }

    #[tokio::test]
    async fn test_local_cache_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalVerbCache::open(dir.path().join("verbs.json")).unwrap();

        let analysis = serde_json::json!({"form": "Parla", "infinitive": "Parlare"});
        cache.set("Parlare", &italian(), &analysis).await.unwrap();

        assert_eq!(cache.get("parlare", &italian()).await, Some(analysis));
        assert_eq!(cache.get("parlare", &LanguageTag::new("spanish")).await, None);
    }

    #[tokio::test]
    async fn test_local_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("verbs.json");

        {
            let cache = LocalVerbCache::open(&path).unwrap();
            assert!(cache.is_empty());
            cache
                .set("chiamare", &italian(), &serde_json::json!({"form": "chiami"}))
                .await
                .unwrap();
        }

        let cache = LocalVerbCache::open(&path).unwrap();
        assert_eq!(cache.len(), 1);
        let stored = cache.get("chiamare", &italian()).await.unwrap();
        assert_eq!(stored["form"], "chiami");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("verb:italian:chiamare"));
    }

    #[tokio::test]
    async fn test_local_set_replaces_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalVerbCache::open(dir.path().join("verbs.json")).unwrap();

        cache
            .set("essere", &italian(), &serde_json::json!({"form": "sono", "tense": "present"}))
            .await
            .unwrap();
        cache
            .set("essere", &italian(), &serde_json::json!({"form": "ero"}))
            .await
            .unwrap();

        assert_eq!(
            cache.get("essere", &italian()).await,
            Some(serde_json::json!({"form": "ero"}))
        );
    }

    #[tokio::test]
    async fn test_corrupt_local_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verbs.json");
        std::fs::write(&path, "not json").unwrap();

        let cache = LocalVerbCache::open(&path).unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_local_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verbs.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let cache = LocalVerbCache::open(&path).unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_local_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the path cannot be read as a file.
        let path = dir.path().join("verbs.json");
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            LocalVerbCache::open(&path),
            Err(EnrichError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_get_reads_analysis_column() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/verb_analysis"))
            .and(query_param("infinitive", "eq.chiamare"))
            .and(query_param("language", "eq.italian"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"analysis": {"form": "chiami", "infinitive": "chiamare"}}
            ])))
            .mount(&server)
            .await;

        let store = SupabaseVerbStore::new(&server.uri(), "anon");
        let analysis = store.get("Chiamare", &italian()).await.unwrap();
        assert_eq!(analysis["form"], "chiami");
    }

    #[tokio::test]
    async fn test_remote_get_fails_soft() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = SupabaseVerbStore::new(&server.uri(), "anon");
        assert_eq!(store.get("chiamare", &italian()).await, None);
    }

    #[tokio::test]
    async fn test_remote_set_upserts_on_composite_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/verb_analysis"))
            .and(query_param("on_conflict", "infinitive,language"))
            .and(body_json(serde_json::json!({
                "infinitive": "chiamare",
                "language": "italian",
                "analysis": {"form": "chiami"}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseVerbStore::new(&server.uri(), "anon");
        store
            .set("Chiamare", &italian(), &serde_json::json!({"form": "chiami"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_conjugation_upsert_carries_source() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/verb_conjugations"))
            .and(query_param("on_conflict", "infinitive,language"))
            .and(body_json(serde_json::json!([{
                "infinitive": "chiamare",
                "language": "italian",
                "conjugation": {"indicativo": {"presente": {"1s": "chiamo"}}},
                "source": "openai"
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let record: ConjugationRecord = serde_json::from_value(serde_json::json!({
            "infinitive": "chiamare",
            "language": "italian",
            "conjugation": {"indicativo": {"presente": {"1s": "chiamo"}}}
        }))
        .unwrap();
        let store = SupabaseVerbStore::new(&server.uri(), "anon");
        store.upsert_conjugation(&record, "openai").await.unwrap();
    }

    #[tokio::test]
    async fn test_conjugation_upsert_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let record: ConjugationRecord = serde_json::from_value(serde_json::json!({
            "infinitive": "chiamare",
            "language": "italian",
            "conjugation": {"present": {}}
        }))
        .unwrap();
        let store = SupabaseVerbStore::new(&server.uri(), "anon");
        let err = store.upsert_conjugation(&record, "openai").await.unwrap_err();
        assert!(matches!(err, EnrichError::Storage(_)));
    }
}
