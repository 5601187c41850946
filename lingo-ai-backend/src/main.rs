mod cefr;
mod completion_cache;
mod config;
mod detect;
mod error;
mod openai;
mod prompt;
mod verbs;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use completion_cache::{
    CompletionCache, CompletionCacheStore, MemoryCompletionStore, SupabaseCompletionStore,
};
use config::Config;
use openai::{CompletionProvider, OpenAiClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn CompletionProvider>,
    pub completions: Arc<CompletionCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn CompletionCacheStore>,
    ) -> Self {
        let completions = CompletionCache::new(
            store,
            provider.clone(),
            config.cefr_model.clone(),
            config.cefr_cache_ttl,
        );
        Self {
            config: Arc::new(config),
            provider,
            completions: Arc::new(completions),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from lingo!" }))
        .route("/cefr", post(cefr::cefr_rewrite))
        .route("/detect-language", post(detect::detect_language))
        .route("/analyze-verbs", post(verbs::analyze_verbs))
        .route("/conjugate-verb", post(verbs::conjugate_verb))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    ));
    let store: Arc<dyn CompletionCacheStore> = match &config.supabase {
        Some(supabase) => Arc::new(SupabaseCompletionStore::new(
            &supabase.supabase_url,
            &supabase.service_role_key,
        )),
        None => {
            log::warn!("Supabase not configured, completion cache is in-memory only");
            Arc::new(MemoryCompletionStore::default())
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, provider, store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let app = app(state).layer(CompressionLayer::new()).layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use language_utils::{AnalyzeVerbsResponse, CefrResponse, ConjugationRecord, ErrorBody};
    use openai::testing::ScriptedProvider;
    use tower::ServiceExt;

    const CEFR_ANSWER: &str = r#"{
        "input": "I eat apples.",
        "analysis": {"level": "A1", "justification": "Simple present."},
        "results": [
            {"level": "A1", "sentence": "I eat apples.", "explanation": "Basic."},
            {"level": "A2", "sentence": "I usually eat apples.", "explanation": "Adverb."},
            {"level": "B2", "sentence": "I tend to snack on apples.", "explanation": "Idiom."}
        ]
    }"#;

    fn test_config() -> Config {
        Config::from_lookup(|key: &str| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string()))
            .unwrap()
    }

    fn test_app(provider: Arc<ScriptedProvider>) -> Router {
        app(AppState::new(
            test_config(),
            provider,
            Arc::new(MemoryCompletionStore::default()),
        ))
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_cefr_returns_only_requested_levels() {
        let provider = Arc::new(ScriptedProvider::new([CEFR_ANSWER]));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/cefr",
            serde_json::json!({"sentence": "I eat apples.", "levels": ["b2", "A1", "A1"]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: CefrResponse = serde_json::from_slice(&body).unwrap();
        let levels: Vec<_> = response.results.iter().map(|r| r.level.as_str()).collect();
        assert_eq!(levels, ["A1", "B2"]);

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].model, "gpt-4o-mini-2024-07-18");
        assert!(requests[0].messages[0].content.contains("and no others: A1, B2"));
    }

    #[tokio::test]
    async fn test_repeated_cefr_request_hits_cache() {
        let provider = Arc::new(ScriptedProvider::new([CEFR_ANSWER]));
        let app = test_app(provider.clone());
        let request = serde_json::json!({"sentence": "I eat apples."});

        let (first_status, first) = post_json(&app, "/cefr", request.clone()).await;
        let (second_status, second) = post_json(&app, "/cefr", request).await;

        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(second_status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_cefr_unknown_level_is_rejected() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider.clone());

        let (status, _) = post_json(
            &app,
            "/cefr",
            serde_json::json!({"sentence": "I eat apples.", "levels": ["D4"]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_cefr_garbage_answer_reports_raw() {
        let provider = Arc::new(ScriptedProvider::new(["not json at all"]));
        let app = test_app(provider);

        let (status, body) =
            post_json(&app, "/cefr", serde_json::json!({"sentence": "I eat apples."})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Failed to parse OpenAI response as JSON");
        assert_eq!(error.raw.as_deref(), Some("not json at all"));
    }

    #[tokio::test]
    async fn test_detect_language_without_model() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/detect-language",
            serde_json::json!({"sentence": "Come ti chiami?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["language"], "italian");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_detect_language_falls_back_to_model() {
        let provider = Arc::new(ScriptedProvider::new(["Dutch."]));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/detect-language",
            serde_json::json!({"sentence": "Ik ben moe en ik heb honger"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["language"], "dutch");
        assert_eq!(provider.calls(), 1);
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_detect_language_rejects_short_sentence() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider);

        let (status, body) =
            post_json(&app, "/detect-language", serde_json::json!({"sentence": " hi "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Sentence too short");
    }

    #[tokio::test]
    async fn test_analyze_verbs_accepts_fenced_json() {
        let answer = r#"```json
{"verbs": [{"form": "chiami", "infinitive": "chiamare", "tense": "present", "mood": "indicative", "person": "second", "number": "singular"}]}
```"#;
        let provider = Arc::new(ScriptedProvider::new([answer]));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/analyze-verbs",
            serde_json::json!({"sentence": "Come ti chiami?", "language": "italian"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: AnalyzeVerbsResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.verbs[0].infinitive, "chiamare");
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, 0.2);
        assert!(requests[0].messages[1].content.contains(r#""Come ti chiami?" in italian"#));
    }

    #[tokio::test]
    async fn test_analyze_verbs_passes_verbs_through_unchanged() {
        let answer = r#"{"verbs": [{"infinitive": "andare", "tense": "passato prossimo", "auxiliary": "essere"}]}"#;
        let provider = Arc::new(ScriptedProvider::new([answer]));
        let app = test_app(provider);

        let (status, body) = post_json(
            &app,
            "/analyze-verbs",
            serde_json::json!({"sentence": "Sono andato a casa.", "language": "italian"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["verbs"][0],
            serde_json::json!({"infinitive": "andare", "tense": "passato prossimo", "auxiliary": "essere"})
        );
    }

    #[tokio::test]
    async fn test_analyze_verbs_requires_language() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider);

        let (status, _) = post_json(
            &app,
            "/analyze-verbs",
            serde_json::json!({"sentence": "Come ti chiami?"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            &app,
            "/analyze-verbs",
            serde_json::json!({"sentence": "Come ti chiami?", "language": "unknown"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_conjugate_verb() {
        let answer = r#"{"infinitive": "chiamare", "language": "italian", "conjugation": {"indicativo": {"presente": {"1s": "chiamo"}}}}"#;
        let provider = Arc::new(ScriptedProvider::new([answer]));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/conjugate-verb",
            serde_json::json!({"infinitive": "chiamare", "language": "Italian"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let record: ConjugationRecord = serde_json::from_slice(&body).unwrap();
        assert!(record.is_complete());
        let requests = provider.requests.lock().unwrap();
        assert!(requests[0].messages[1].content.contains("Italian verb \"chiamare\""));
    }

    #[tokio::test]
    async fn test_conjugate_verb_unsupported_language() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider.clone());

        let (status, body) = post_json(
            &app,
            "/conjugate-verb",
            serde_json::json!({"infinitive": "lopen", "language": "dutch"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Unsupported language");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
        let app = test_app(provider);

        let (status, _) = post_json(
            &app,
            "/conjugate-verb",
            serde_json::json!({"infinitive": "parlare", "language": "italian"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
