use language_utils::{CefrLevel, CefrRequest, CefrResponse};

use crate::edge::EdgeClient;
use crate::error::EnrichError;

impl EdgeClient {
    /// Ask the backend for CEFR rewrites of `sentence`.
    ///
    /// An empty `levels` asks for all six. `dynamic` asks for only the detected
    /// level and the one above it.
    pub async fn fetch_cefr_levels(
        &self,
        sentence: &str,
        levels: &[CefrLevel],
        dynamic: bool,
    ) -> Result<CefrResponse, EnrichError> {
        let request = CefrRequest {
            sentence: sentence.to_string(),
            levels: Some(levels.iter().map(ToString::to_string).collect()),
            dynamic,
        };
        self.post_json(
            "Fetch CEFR breakdown",
            self.config().cefr_url.as_deref(),
            "CEFR_URL",
            &request,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> EdgeClient {
        EdgeClient::new(Config {
            supabase_anon_key: Some("anon".to_string()),
            cefr_url: Some(format!("{}/cefr", server.uri())),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_cefr_levels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cefr"))
            .and(body_json(serde_json::json!({
                "sentence": "I eat apples.",
                "levels": ["A1", "B2"],
                "dynamic": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "input": "I eat apples.",
                "analysis": {"level": "A1", "justification": "Simple."},
                "results": [
                    {"level": "A1", "sentence": "I eat apples.", "explanation": "Basic."},
                    {"level": "B2", "sentence": "I'm partial to apples.", "explanation": "Idiom."}
                ]
            })))
            .mount(&server)
            .await;

        let response = client(&server)
            .fetch_cefr_levels("I eat apples.", &[CefrLevel::A1, CefrLevel::B2], false)
            .await
            .unwrap();
        assert_eq!(response.analysis.level, "A1");
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_cefr_levels_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Failed to parse OpenAI response as JSON",
                "raw": "oops"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_cefr_levels("I eat apples.", &[], true)
            .await
            .unwrap_err();
        match err {
            EnrichError::Upstream { status, body, .. } => {
                assert_eq!(status, 500);
                assert!(body.contains("\"raw\":\"oops\""));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
