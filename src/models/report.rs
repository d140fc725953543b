use serde::Serialize;

/// Aggregate results for one movie, computed at read time over judged reviews.
#[derive(Debug, Clone, Serialize)]
pub struct MovieReport {
    pub title: String,
    /// Reviews with a Complete judgment.
    pub total_reviews: usize,
    /// Fresh percentage over rated reviews; absent when nothing is rated.
    pub raw_score: Option<f64>,
    /// Judgment-weighted score on the 0-100 scale. Exactly 0 (not absent)
    /// when no review carries positive weight.
    pub sanitized_score: f64,
    pub mean_original_rating: Option<f64>,
    pub mean_quality_score: Option<f64>,
    pub authentic_count: usize,
    pub inauthentic_count: usize,
    pub quality_histogram: Vec<QualityBucket>,
}

/// One bucket of the fixed five-bucket quality-score distribution.
#[derive(Debug, Clone, Serialize)]
pub struct QualityBucket {
    pub label: String,
    pub count: usize,
    pub mean_quality: f64,
}
