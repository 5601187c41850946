//! CEFR levels and the wire types of the CEFR rewrite endpoint.

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// A point on the six-level Common European Framework of Reference scale.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    FromStr,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    schemars::JsonSchema,
)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// All levels in canonical order, A1 first.
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    /// Lenient parse: surrounding whitespace and case are ignored.
    pub fn parse(level: &str) -> Option<CefrLevel> {
        level.trim().to_uppercase().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognised CEFR level: {0:?}")]
pub struct UnknownLevelError(pub String);

/// De-duplicate and sort the requested levels into canonical A1→C2 order.
///
/// An empty request means every level.
pub fn normalize_levels<S: AsRef<str>>(levels: &[S]) -> Result<Vec<CefrLevel>, UnknownLevelError> {
    if levels.is_empty() {
        return Ok(CefrLevel::ALL.to_vec());
    }
    let mut parsed = levels
        .iter()
        .map(|level| {
            CefrLevel::parse(level.as_ref())
                .ok_or_else(|| UnknownLevelError(level.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    parsed.sort();
    parsed.dedup();
    Ok(parsed)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CefrRequest {
    pub sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<String>>,
    #[serde(default)]
    pub dynamic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct CefrAnalysis {
    pub level: String,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct CefrResult {
    pub level: String,
    pub sentence: String,
    pub explanation: String,
}

/// The structured completion returned by the CEFR endpoint and stored in its cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub struct CefrResponse {
    pub input: String,
    pub analysis: CefrAnalysis,
    pub results: Vec<CefrResult>,
}

impl CefrResponse {
    /// Drop rewrites for levels that were not requested.
    pub fn retain_levels(&mut self, levels: &[CefrLevel]) {
        self.results.retain(|result| {
            CefrLevel::parse(&result.level).is_some_and(|level| levels.contains(&level))
        });
    }
}
