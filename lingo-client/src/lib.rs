//! Client side of lingo: verb enrichment over a two-tier cache, CEFR rewrites
//! and DeepL translation.

pub mod cache;
pub mod cefr;
pub mod config;
pub mod edge;
pub mod enrich;
pub mod error;
pub mod translate;

use std::sync::Arc;

pub use config::Config;
pub use edge::EdgeClient;
pub use enrich::{VerbData, VerbEnricher};
pub use error::EnrichError;

use cache::{LocalVerbCache, SupabaseVerbStore};

impl VerbEnricher {
    /// Wire the enricher to the deployed endpoints, the local cache file and Supabase.
    pub fn from_config(config: &Config) -> Result<Self, EnrichError> {
        let supabase_url = config
            .supabase_url
            .as_deref()
            .ok_or_else(|| EnrichError::missing("SUPABASE_URL"))?;
        let remote = Arc::new(SupabaseVerbStore::new(supabase_url, config.anon_key()?));
        let local = Arc::new(LocalVerbCache::open(&config.cache_path)?);
        let edge = Arc::new(EdgeClient::new(config.clone()));

        Ok(Self::new(
            edge.clone(),
            edge.clone(),
            edge,
            local,
            remote.clone(),
            remote,
        ))
    }
}
