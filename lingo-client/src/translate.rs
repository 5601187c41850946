//! DeepL text translation.

use language_utils::translation::{AUTO_DETECT, deepl_code};
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TranslationError {
    pub message: String,
    pub status: Option<u16>,
}

impl TranslationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Lowercased DeepL code, when DeepL reported one.
    pub detected_source_language: Option<String>,
}

#[derive(Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'static str>,
}

#[derive(Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct DeepLErrorBody {
    message: Option<String>,
}

fn status_message(status: u16) -> Option<&'static str> {
    Some(match status {
        400 => "Bad request. Please check your input.",
        403 => "Invalid API key or insufficient permissions.",
        413 => "Text too long for translation.",
        429 => "Too many requests. Please try again later.",
        456 => "Quota exceeded. Please check your DeepL account.",
        503 => "Service temporarily unavailable. Please try again later.",
        _ => return None,
    })
}

pub struct DeepLTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl DeepLTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.deepl_api_url.clone(),
            api_key: config.deepl_api_key.clone(),
        }
    }

    /// Translate `text` from `source` (an app code, or `"auto"`) into `target`.
    ///
    /// An unmapped source code is treated like `"auto"`.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, TranslationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TranslationError::new(
                "API key is required. Provide it in the request or set DEEPL_API_KEY environment variable.",
            )
        })?;
        if text.trim().is_empty() {
            return Err(TranslationError::new("Text to translate cannot be empty"));
        }
        let target_lang = deepl_code(target)
            .ok_or_else(|| TranslationError::new(format!("Unsupported target language: {target}")))?;
        let source_lang = if source == AUTO_DETECT {
            None
        } else {
            deepl_code(source)
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {api_key}"))
            .json(&DeepLRequest {
                text: [text],
                target_lang,
                source_lang,
            })
            .send()
            .await
            .map_err(|e| {
                log::error!("DeepL request failed: {e}");
                TranslationError::new("Network error. Please check your internet connection.")
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = match status_message(status) {
                Some(message) => message.to_string(),
                None => response
                    .json::<DeepLErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| format!("HTTP error! status: {status}")),
            };
            return Err(TranslationError {
                message,
                status: Some(status),
            });
        }

        let body: DeepLResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::new(e.to_string()))?;
        let translation = body
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::new("No translation received from DeepL API"))?;

        Ok(Translation {
            text: translation.text,
            detected_source_language: translation
                .detected_source_language
                .map(|code| code.to_lowercase()),
        })
    }
}
