use axum::{Json, extract::State, extract::rejection::JsonRejection};
use language_utils::{CefrRequest, CefrResponse, cefr::normalize_levels};

use crate::{AppState, error::ApiError, prompt::build_cefr_prompt};

pub async fn cefr_rewrite(
    State(state): State<AppState>,
    payload: Result<Json<CefrRequest>, JsonRejection>,
) -> Result<Json<CefrResponse>, ApiError> {
    let Json(request) = payload?;
    let sentence = request.sentence.trim();
    if sentence.is_empty() {
        return Err(ApiError::bad_request("Missing sentence"));
    }

    let levels = normalize_levels(&request.levels.unwrap_or_default())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let prompt = build_cefr_prompt(sentence, &levels, request.dynamic);
    let mut response: CefrResponse = state.completions.resolve(&prompt).await?;

    // Dynamic mode picks its own two levels.
    if !request.dynamic {
        response.retain_levels(&levels);
    }

    Ok(Json(response))
}
