//! Verb extraction and conjugation endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use language_utils::{
    AnalyzeVerbsRequest, AnalyzeVerbsResponse, ConjugateVerbRequest, ConjugationRecord, Language,
};

use crate::{
    AppState,
    error::ApiError,
    openai::{ChatRequest, parse_json_content},
};

const ANALYZE_SYSTEM_PROMPT: &str = "You are a grammar tutor. Output only JSON.";

const JSON_ONLY: &str = "IMPORTANT: Return ONLY a valid JSON object. Do NOT use markdown, do NOT use a code block, do NOT add any explanation or extra text. Only output the JSON object.";

pub async fn analyze_verbs(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeVerbsRequest>, JsonRejection>,
) -> Result<Json<AnalyzeVerbsResponse>, ApiError> {
    let Json(request) = payload?;
    let sentence = request.sentence.trim();
    if sentence.is_empty() || request.language.is_unknown() {
        return Err(ApiError::bad_request("Missing sentence or language"));
    }

    let prompt = format!(
        r#"
For the sentence "{sentence}" in {language}, return a JSON object with a 'verbs' array. Each verb should include:
- form
- infinitive
- tense
- mood
- person
- number
If there are no verbs, return {{ "verbs": [] }}.
Output only valid JSON, nothing else.

Sample format:
{{
  "verbs": [
    {{
      "form": "chiami",
      "infinitive": "chiamare",
      "tense": "present",
      "mood": "indicative",
      "person": "second",
      "number": "singular"
    }}
  ]
}}
"#,
        language = request.language,
    );

    let chat = ChatRequest::new(&state.config.verb_model, 0.2)
        .system(ANALYZE_SYSTEM_PROMPT)
        .user(prompt);
    let content = state.provider.complete(chat).await?;
    let response: AnalyzeVerbsResponse = parse_json_content(&content)?;

    if response.verbs.is_empty() {
        log::warn!("No verbs found in the sentence: {sentence}");
    }
    Ok(Json(response))
}

fn conjugation_template(language: Language) -> &'static str {
    match language {
        Language::English => {
            r#"Conjugate the English verb "{{infinitive}}" in present simple, past simple, and future simple.

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "english",
  "conjugation": {
    "present_simple": {
      "1s": "...", "2s": "...", "3s": "...",
      "1p": "...", "2p": "...", "3p": "..."
    },
    "past_simple": { ... },
    "future_simple": { ... }
  }
}"#
        }
        Language::Italian => {
            r#"Conjugate the Italian verb "{{infinitive}}" in the following moods and tenses:
- Indicativo: presente, imperfetto, passato prossimo, futuro semplice
- Congiuntivo: presente, imperfetto
- Condizionale: presente
- Imperativo: presente

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "italian",
  "conjugation": {
    "indicativo": {
      "presente": { "1s": "...", ..., "3p": "..." },
      ...
    },
    "congiuntivo": {
      "presente": { ... },
      "imperfetto": { ... }
    },
    "condizionale": {
      "presente": { ... }
    },
    "imperativo": {
      "presente": { ... }
    }
  }
}"#
        }
        Language::Spanish => {
            r#"Conjugate the Spanish verb "{{infinitive}}" in the following:
- Indicativo: presente, pretérito, imperfecto, futuro
- Subjuntivo: presente
- Condicional: simple
- Imperativo: afirmativo

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "spanish",
  "conjugation": {
    "indicativo": {
      "presente": { ... },
      "pretérito": { ... },
      "imperfecto": { ... },
      "futuro": { ... }
    },
    "subjuntivo": {
      "presente": { ... }
    },
    "condicional": {
      "simple": { ... }
    },
    "imperativo": {
      "afirmativo": { ... }
    }
  }
}"#
        }
        Language::French => {
            r#"Conjugate the French verb "{{infinitive}}" in:
- Indicatif: présent, imparfait, futur simple, passé composé
- Subjonctif: présent
- Conditionnel: présent
- Impératif: présent

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "french",
  "conjugation": {
    "indicatif": {
      "présent": { ... },
      "imparfait": { ... },
      "futur_simple": { ... },
      "passé_composé": { ... }
    },
    "subjonctif": {
      "présent": { ... }
    },
    "conditionnel": {
      "présent": { ... }
    },
    "impératif": {
      "présent": { ... }
    }
  }
}"#
        }
        Language::German => {
            r#"Conjugate the German verb "{{infinitive}}" in:
- Präsens
- Präteritum
- Perfekt
- Futur I

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "german",
  "conjugation": {
    "präsens": { ... },
    "präteritum": { ... },
    "perfekt": { ... },
    "futur_I": { ... }
  }
}"#
        }
        Language::Portuguese => {
            r#"Conjugate the Portuguese verb "{{infinitive}}" in:
- Presente, pretérito perfeito, imperfeito, futuro
- Subjuntivo: presente
- Condicional: simples
- Imperativo: afirmativo

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "portuguese",
  "conjugation": {
    "presente": { ... },
    "pretérito_perfeito": { ... },
    "imperfeito": { ... },
    "futuro": { ... },
    "subjuntivo": { "presente": { ... } },
    "condicional": { "simples": { ... } },
    "imperativo": { "afirmativo": { ... } }
  }
}"#
        }
        Language::Russian => {
            r#"Conjugate the Russian verb "{{infinitive}}" in:
- Present, past, and future

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "russian",
  "conjugation": {
    "present": { ... },
    "past": { ... },
    "future": { ... }
  }
}"#
        }
        Language::Japanese => {
            r#"Conjugate the Japanese verb "{{infinitive}}" in:
- Present plain: positive, negative
- Past plain: positive, negative

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "japanese",
  "conjugation": {
    "present_plain": {
      "positive": "...",
      "negative": "..."
    },
    "past_plain": {
      "positive": "...",
      "negative": "..."
    }
  }
}"#
        }
        Language::Korean => {
            r#"Conjugate the Korean verb "{{infinitive}}" in:
- Present: formal, informal
- Past: formal, informal

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "korean",
  "conjugation": {
    "present": {
      "formal": "...",
      "informal": "..."
    },
    "past": {
      "formal": "...",
      "informal": "..."
    }
  }
}"#
        }
        Language::Chinese => {
            r#"Conjugate the Mandarin Chinese verb "{{infinitive}}" in:
- Present, past, future

Format response:
{
  "infinitive": "{{infinitive}}",
  "language": "chinese",
  "conjugation": {
    "present": { "form": "..." },
    "past": { "form": "..." },
    "future": { "form": "..." }
  }
}"#
        }
    }
}

pub fn conjugation_prompt(language: Language, infinitive: &str) -> String {
    let body = conjugation_template(language).replace("{{infinitive}}", infinitive);
    format!("{body}\n{JSON_ONLY}")
}

pub async fn conjugate_verb(
    State(state): State<AppState>,
    payload: Result<Json<ConjugateVerbRequest>, JsonRejection>,
) -> Result<Json<ConjugationRecord>, ApiError> {
    let Json(request) = payload?;
    let infinitive = request.infinitive.trim();
    if infinitive.is_empty() || request.language.is_unknown() {
        return Err(ApiError::bad_request("Missing infinitive or language"));
    }
    let Some(language) = request.language.language() else {
        log::info!("Unsupported conjugation language: {}", request.language);
        return Err(ApiError::bad_request("Unsupported language"));
    };

    let chat = ChatRequest::new(&state.config.verb_model, 0.0)
        .system(format!("You are a verb conjugation engine. {JSON_ONLY}"))
        .user(conjugation_prompt(language, infinitive));
    let content = state.provider.complete(chat).await?;
    let record: ConjugationRecord = parse_json_content(&content)?;

    Ok(Json(record))
}
