use serde::{Deserialize, Serialize};

use crate::constants::judgment::{FALLBACK_QUALITY, FALLBACK_REASONING};

/// The judge's answer for a single review. `quality_score` is on the judge's
/// [0.1, 1.0] convention; it is recorded as-is, never verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub is_authentic: bool,
    pub quality_score: f64,
    pub reasoning: String,
}

impl JudgeVerdict {
    /// Fixed verdict recorded when the judge call fails. Terminal for the
    /// review in this run; it will not be retried automatically.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            is_authentic: false,
            quality_score: FALLBACK_QUALITY,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

/// Lifecycle of a review's judgment. Storage encodes this via nullable
/// columns; everything above the repository works with the tagged form so a
/// half-populated state cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Judgment {
    Pending,
    Complete(JudgeVerdict),
}

impl Judgment {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}
