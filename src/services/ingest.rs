use crate::db::{ReviewOutcome, Store};
use crate::models::review::{IngestCounts, RawReview};
use anyhow::Result;
use tracing::{info, warn};

/// Persists one scrape pass: upserts the movie, then inserts each raw review
/// unless its fingerprint is already stored.
pub struct IngestService {
    store: Store,
}

impl IngestService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn ingest(
        &self,
        title: &str,
        source_url: &str,
        reviews: &[RawReview],
    ) -> Result<(i32, IngestCounts)> {
        let movie_id = self.store.upsert_movie(title, source_url).await?;

        let mut counts = IngestCounts::default();

        for review in reviews {
            if review.text.trim().is_empty() {
                warn!("Skipping review with empty text (user: {:?})", review.username);
                continue;
            }

            match self.store.insert_review_if_new(movie_id, review).await? {
                ReviewOutcome::Inserted(_) => counts.inserted += 1,
                ReviewOutcome::Duplicate => counts.duplicate += 1,
            }
        }

        info!(
            "Ingested '{}' (movie {}): {} new reviews, {} duplicates skipped",
            title, movie_id, counts.inserted, counts.duplicate
        );

        Ok((movie_id, counts))
    }
}
