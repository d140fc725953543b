use crate::constants::scoring::{FRESH_THRESHOLD, STAR_TO_PERCENT};
use crate::db::{JudgedReviewRow, Store};
use crate::models::report::{MovieReport, QualityBucket};
use anyhow::Result;

/// Read-time score computations over the store. All arithmetic lives in the
/// pure helpers below; the service only fetches rows.
pub struct ScoringService {
    store: Store,
}

impl ScoringService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Percentage of rated reviews at or above the fresh threshold. Absent
    /// when the movie has no rated reviews at all.
    pub async fn raw_audience_score(&self, movie_id: i32) -> Result<Option<f64>> {
        let ratings = self.store.rated_ratings_for(movie_id).await?;
        Ok(fresh_percentage(&ratings))
    }

    /// Judgment-weighted average of original ratings on the 0-100 scale.
    /// Exactly 0 (not absent) when no review carries positive weight.
    pub async fn sanitized_score(&self, movie_id: i32) -> Result<f64> {
        let rows = self.store.judged_rows_for(movie_id).await?;
        Ok(weighted_score(&rows))
    }

    /// Full report for a movie by title; `None` when the title is unknown.
    pub async fn report(&self, title: &str) -> Result<Option<MovieReport>> {
        let Some(movie) = self.store.get_movie_by_title(title).await? else {
            return Ok(None);
        };

        let rows = self.store.judged_rows_for(movie.id).await?;
        let ratings = self.store.rated_ratings_for(movie.id).await?;

        let rated: Vec<f64> = rows.iter().filter_map(|r| r.original_rating).collect();
        let qualities: Vec<f64> = rows.iter().map(|r| r.quality_score).collect();
        let authentic_count = rows.iter().filter(|r| r.is_authentic).count();

        Ok(Some(MovieReport {
            title: movie.title,
            total_reviews: rows.len(),
            raw_score: fresh_percentage(&ratings),
            sanitized_score: weighted_score(&rows),
            mean_original_rating: mean(&rated).map(round2),
            mean_quality_score: mean(&qualities).map(round2),
            authentic_count,
            inauthentic_count: rows.len() - authentic_count,
            quality_histogram: quality_histogram(&qualities),
        }))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn fresh_percentage(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    let fresh = ratings.iter().filter(|&&r| r >= FRESH_THRESHOLD).count();
    Some(round2(fresh as f64 / ratings.len() as f64 * 100.0))
}

/// Weight per review is the quality score for authentic reviews and 0
/// otherwise; unrated reviews contribute nothing either way.
fn weighted_score(rows: &[JudgedReviewRow]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for row in rows {
        let Some(rating) = row.original_rating else {
            continue;
        };
        let weight = if row.is_authentic {
            row.quality_score
        } else {
            0.0
        };

        weighted_sum += rating * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        round2(weighted_sum / total_weight * STAR_TO_PERCENT)
    } else {
        0.0
    }
}

const BUCKET_LABELS: [&str; 5] = [
    "Excellent (0.9-1.0)",
    "Good (0.7-0.89)",
    "Fair (0.5-0.69)",
    "Poor (0.3-0.49)",
    "Very Poor (0.1-0.29)",
];

const fn bucket_index(quality: f64) -> usize {
    if quality >= 0.9 {
        0
    } else if quality >= 0.7 {
        1
    } else if quality >= 0.5 {
        2
    } else if quality >= 0.3 {
        3
    } else {
        4
    }
}

/// Fixed five-bucket distribution of quality scores. Empty buckets are
/// omitted; the rest are ordered by descending bucket mean.
fn quality_histogram(qualities: &[f64]) -> Vec<QualityBucket> {
    let mut members: [Vec<f64>; 5] = Default::default();
    for &quality in qualities {
        members[bucket_index(quality)].push(quality);
    }

    let mut buckets: Vec<QualityBucket> = BUCKET_LABELS
        .iter()
        .zip(&members)
        .filter_map(|(label, values)| {
            mean(values).map(|m| QualityBucket {
                label: (*label).to_string(),
                count: values.len(),
                mean_quality: round2(m),
            })
        })
        .collect();

    buckets.sort_by(|a, b| {
        b.mean_quality
            .partial_cmp(&a.mean_quality)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    buckets
}
