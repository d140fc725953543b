use serde::{Deserialize, Serialize};

/// One review record as handed over by the scraping collaborator, before it
/// touches the store. Field order matches the on-page review card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    pub text: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub username: Option<String>,
    pub date: String,
}

/// Per-run ingestion tallies, reported back to the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestCounts {
    pub inserted: usize,
    pub duplicate: usize,
}
