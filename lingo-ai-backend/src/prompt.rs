//! CEFR prompt rendering and hashing.
//!
//! The rendered prompt text is the cache key: sentence, level set and mode all
//! change the text, so they all change the hash.

use language_utils::CefrLevel;
use sha2::{Digest, Sha256};

/// Render the CEFR rewrite prompt.
///
/// `levels` must already be normalized (sorted, de-duplicated). Dynamic mode
/// asks only for the detected level and the one above it, so `levels` is not
/// rendered there.
pub fn build_cefr_prompt(sentence: &str, levels: &[CefrLevel], dynamic: bool) -> String {
    if dynamic {
        return format!(
            r#"
You will receive a sentence from a user. Return a JSON object with:
- the original input
- an analysis field with the overall CEFR level of the input sentence (A1, A2, B1, B2, C1, or C2) and a short justification
- rewritten versions for exactly two CEFR levels: the level you detected for the input, and the next level up (if the input is C2, return only C2)
- a short explanation of why each rewrite matches its CEFR level

Format:

{{
  "input": "<original>",
  "analysis": {{
    "level": "<overall CEFR level>",
    "justification": "<short justification>"
  }},
  "results": [
    {{ "level": "<detected level>", "sentence": "...", "explanation": "..." }},
    {{ "level": "<next level up>", "sentence": "...", "explanation": "..." }}
  ]
}}

Output only valid JSON, nothing else.

Sentence: {sentence}
"#
        );
    }

    let level_list = levels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let example_results = levels
        .iter()
        .map(|level| format!(r#"    {{ "level": "{level}", "sentence": "...", "explanation": "..." }}"#))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"
You will receive a sentence from a user. Return a JSON object with:
- the original input
- an analysis field with the overall CEFR level of the input sentence (A1, A2, B1, B2, C1, or C2) and a short justification
- rewritten versions for each of these CEFR levels, and no others: {level_list}
- a short explanation of why each rewrite matches its CEFR level

Format:

{{
  "input": "<original>",
  "analysis": {{
    "level": "<overall CEFR level>",
    "justification": "<short justification>"
  }},
  "results": [
{example_results}
  ]
}}

Output only valid JSON, nothing else.

Sentence: {sentence}
"#
    )
}

/// SHA-256 of the exact prompt bytes, lowercase hex.
pub fn prompt_hash(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}
