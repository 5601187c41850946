use axum::{Json, extract::State, extract::rejection::JsonRejection};
use language_utils::{
    DetectLanguageRequest, DetectLanguageResponse, LanguageTag, detection,
    text_cleanup::normalize_language_answer,
};

use crate::{AppState, error::ApiError, openai::ChatRequest};

const SYSTEM_PROMPT: &str =
    "You are a language detector. Return only the language name in lowercase.";

pub async fn detect_language(
    State(state): State<AppState>,
    payload: Result<Json<DetectLanguageRequest>, JsonRejection>,
) -> Result<Json<DetectLanguageResponse>, ApiError> {
    let Json(request) = payload?;
    let sentence = request.sentence.trim();
    if sentence.chars().count() < state.config.min_sentence_chars {
        return Err(ApiError::bad_request("Sentence too short"));
    }

    if let Some(language) = detection::classify(sentence) {
        log::info!("Detected {language} from script and stopwords");
        return Ok(Json(DetectLanguageResponse {
            language: language.into(),
        }));
    }

    log::warn!("Statistical detection inconclusive, asking the model");
    let prompt = format!(
        "Detect the language of this sentence. Only return the lowercase name, like \"italian\", \"french\", etc.\n\nSentence: \"{sentence}\""
    );
    let request = ChatRequest::new(&state.config.verb_model, 0.0)
        .system(SYSTEM_PROMPT)
        .user(prompt);
    let answer = state.provider.complete(request).await?;

    let language = match normalize_language_answer(&answer) {
        Some(name) => LanguageTag::new(name),
        None => {
            log::warn!("Model gave no usable language name: {answer:?}");
            LanguageTag::unknown()
        }
    };
    Ok(Json(DetectLanguageResponse { language }))
}
