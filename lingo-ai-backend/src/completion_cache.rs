//! Idempotent-completion cache keyed by prompt hash.
//!
//! A request is served from the cache while its entry is younger than the
//! TTL. Stale entries are never purged; the next miss overwrites them.
//! Concurrent misses on the same prompt both call the provider and the last
//! upsert wins.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postgrest::Postgrest;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::openai::{ChatRequest, CompletionProvider, ContentParseError, ProviderError};
use crate::prompt::prompt_hash;

const TABLE: &str = "openai_cache";

/// One row of the `openai_cache` table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub prompt_hash: String,
    pub prompt: String,
    pub response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cache request failed: {0}")]
    Request(String),

    #[error("Cache backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Cache row could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait CompletionCacheStore: Send + Sync {
    async fn get(&self, prompt_hash: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Insert or fully replace the entry for `entry.prompt_hash`.
    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError>;
}

/// In-process store, used when no Supabase project is configured.
#[derive(Default)]
pub struct MemoryCompletionStore {
    entries: Mutex<std::collections::HashMap<String, CacheEntry>>,
}

#[async_trait]
impl CompletionCacheStore for MemoryCompletionStore {
    async fn get(&self, prompt_hash: &str) -> Result<Option<CacheEntry>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Request(format!("{e}")))?;
        Ok(entries.get(prompt_hash).cloned())
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Request(format!("{e}")))?;
        entries.insert(entry.prompt_hash.clone(), entry.clone());
        Ok(())
    }
}

/// The `openai_cache` table behind Supabase's PostgREST API.
pub struct SupabaseCompletionStore {
    client: Postgrest,
}

impl SupabaseCompletionStore {
    pub fn new(supabase_url: &str, service_role_key: &str) -> Self {
        let client = Postgrest::new(format!("{supabase_url}/rest/v1"))
            .insert_header("apikey", service_role_key)
            .insert_header("Authorization", format!("Bearer {service_role_key}"));
        Self { client }
    }
}

#[async_trait]
impl CompletionCacheStore for SupabaseCompletionStore {
    async fn get(&self, prompt_hash: &str) -> Result<Option<CacheEntry>, StoreError> {
        let response = self
            .client
            .from(TABLE)
            .select("prompt_hash,prompt,response,created_at")
            .eq("prompt_hash", prompt_hash)
            .execute()
            .await
            .map_err(|e| StoreError::Request(format!("{e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Request(format!("{e}")))?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Status { status, body });
        }

        let rows: Vec<CacheEntry> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().next())
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let response = self
            .client
            .from(TABLE)
            .upsert(serde_json::to_string(entry)?)
            .on_conflict("prompt_hash")
            .execute()
            .await
            .map_err(|e| StoreError::Request(format!("{e}")))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ContentParseError),
}

pub struct CompletionCache {
    store: Arc<dyn CompletionCacheStore>,
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
    ttl: chrono::Duration,
}

impl CompletionCache {
    pub fn new(
        store: Arc<dyn CompletionCacheStore>,
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            provider,
            model: model.into(),
            temperature: 0.7,
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.created_at < self.ttl
    }

    /// Serve `prompt` from the cache, or ask the provider and store its answer.
    pub async fn resolve<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, CompletionError> {
        let hash = prompt_hash(prompt);
        let now = Utc::now();

        match self.store.get(&hash).await {
            Ok(Some(entry)) if self.is_fresh(&entry, now) => {
                match serde_json::from_value(entry.response) {
                    Ok(response) => {
                        log::info!("Completion cache hit for {hash}");
                        return Ok(response);
                    }
                    Err(e) => log::warn!("Cached completion {hash} no longer parses: {e}"),
                }
            }
            Ok(Some(entry)) => log::info!(
                "Completion cache entry {hash} from {} is stale",
                entry.created_at
            ),
            Ok(None) => log::info!("Completion cache miss for {hash}"),
            Err(e) => log::warn!("Completion cache read failed, treating as miss: {e}"),
        }

        let request = ChatRequest::new(&self.model, self.temperature).user(prompt);
        let content = self.provider.complete(request).await?;
        let response = crate::openai::parse_json_content::<serde_json::Value>(&content)
            .inspect_err(|e| log::error!("Unparsable completion for {hash}: {}", e.raw))?;
        let parsed = serde_json::from_value(response.clone())
            .map_err(|source| ContentParseError { source, raw: content })?;

        let entry = CacheEntry {
            prompt_hash: hash,
            prompt: prompt.to_string(),
            response,
            created_at: now,
        };
        if let Err(e) = self.store.upsert(&entry).await {
            log::error!("Failed to store completion {}: {e}", entry.prompt_hash);
        }

        Ok(parsed)
    }
}
