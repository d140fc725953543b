use crate::constants::{ANONYMOUS_USERNAME, AUDIENCE_REVIEW_KIND};
use crate::entities::{judgments, prelude::*, reviews};
use crate::fingerprint::review_fingerprint;
use crate::models::review::RawReview;
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

/// Result of an ingestion attempt for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Inserted(i32),
    Duplicate,
}

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Fingerprints the review and inserts it unless already stored. A
    /// concurrent writer losing the race on the unique fingerprint is folded
    /// into the duplicate case rather than surfaced as an error.
    pub async fn insert_if_new(&self, movie_id: i32, review: &RawReview) -> Result<ReviewOutcome> {
        let username = review
            .username
            .clone()
            .unwrap_or_else(|| ANONYMOUS_USERNAME.to_string());
        let fingerprint = review_fingerprint(&review.text, &username, &review.date, movie_id);

        let already_stored = Reviews::find()
            .filter(reviews::Column::Fingerprint.eq(&fingerprint))
            .count(&self.conn)
            .await?
            > 0;
        if already_stored {
            return Ok(ReviewOutcome::Duplicate);
        }

        let active_model = reviews::ActiveModel {
            movie_id: Set(movie_id),
            review_text: Set(review.text.clone()),
            original_rating: Set(review.rating),
            review_kind: Set(AUDIENCE_REVIEW_KIND.to_string()),
            username: Set(username),
            review_date: Set(review.date.clone()),
            fingerprint: Set(fingerprint),
            ..Default::default()
        };

        match Reviews::insert(active_model).exec(&self.conn).await {
            Ok(res) => Ok(ReviewOutcome::Inserted(res.last_insert_id)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(ReviewOutcome::Duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reviews of the movie with no Complete judgment, id-ascending. Both
    /// judgment-less reviews and Pending placeholders qualify, so an
    /// interrupted run's leftovers are picked up again.
    pub async fn pending_for_movie(&self, movie_id: i32) -> Result<Vec<(i32, String)>> {
        let complete_ids: Vec<i32> = Judgments::find()
            .filter(judgments::Column::MovieId.eq(movie_id))
            .filter(judgments::Column::IsAuthentic.is_not_null())
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|j| j.review_id)
            .collect();

        let mut query = Reviews::find().filter(reviews::Column::MovieId.eq(movie_id));
        if !complete_ids.is_empty() {
            query = query.filter(reviews::Column::Id.is_not_in(complete_ids));
        }

        let rows = query
            .order_by_asc(reviews::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| (r.id, r.review_text)).collect())
    }

    /// Original ratings of all rated reviews for the movie.
    pub async fn rated_ratings_for(&self, movie_id: i32) -> Result<Vec<f64>> {
        let rows = Reviews::find()
            .filter(reviews::Column::MovieId.eq(movie_id))
            .filter(reviews::Column::OriginalRating.is_not_null())
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().filter_map(|r| r.original_rating).collect())
    }

    pub async fn count_for_movie(&self, movie_id: i32) -> Result<u64> {
        Ok(Reviews::find()
            .filter(reviews::Column::MovieId.eq(movie_id))
            .count(&self.conn)
            .await?)
    }
}
