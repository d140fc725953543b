use std::collections::HashMap;

use crate::constants::judgment::PENDING_REASONING;
use crate::entities::{judgments, prelude::*, reviews};
use crate::models::judgment::{Judgment, JudgeVerdict};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// A judged review flattened for the scoring engine: the reviewer's original
/// rating next to the judge's verdict fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgedReviewRow {
    pub original_rating: Option<f64>,
    pub quality_score: f64,
    pub is_authentic: bool,
}

pub struct JudgmentRepository {
    conn: DatabaseConnection,
}

impl JudgmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Reserves a judgment slot for the review. Insert-if-absent: concurrent
    /// callers racing on the same review id collapse to a single row.
    pub async fn mark_pending(&self, review_id: i32, movie_id: i32) -> Result<()> {
        let active_model = judgments::ActiveModel {
            review_id: Set(review_id),
            movie_id: Set(movie_id),
            is_authentic: Set(None),
            quality_score: Set(None),
            reasoning: Set(Some(PENDING_REASONING.to_string())),
            judged_at: Set(None),
        };

        Judgments::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(judgments::Column::ReviewId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    /// Fills a Pending row. Silently a no-op when no row exists for the id;
    /// correct orchestration always writes the placeholder first.
    pub async fn complete(&self, review_id: i32, verdict: &JudgeVerdict) -> Result<()> {
        use sea_orm::sea_query::Expr;

        Judgments::update_many()
            .col_expr(
                judgments::Column::IsAuthentic,
                Expr::value(verdict.is_authentic),
            )
            .col_expr(
                judgments::Column::QualityScore,
                Expr::value(verdict.quality_score),
            )
            .col_expr(
                judgments::Column::Reasoning,
                Expr::value(verdict.reasoning.clone()),
            )
            .col_expr(
                judgments::Column::JudgedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(judgments::Column::ReviewId.eq(review_id))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// One-shot Complete insert for the non-preallocating workflow. The
    /// conflict clause keeps the one-judgment-per-review invariant when two
    /// workers collide.
    pub async fn insert_complete(
        &self,
        review_id: i32,
        movie_id: i32,
        verdict: &JudgeVerdict,
    ) -> Result<()> {
        let active_model = judgments::ActiveModel {
            review_id: Set(review_id),
            movie_id: Set(movie_id),
            is_authentic: Set(Some(verdict.is_authentic)),
            quality_score: Set(Some(verdict.quality_score)),
            reasoning: Set(Some(verdict.reasoning.clone())),
            judged_at: Set(Some(chrono::Utc::now().to_rfc3339())),
        };

        Judgments::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(judgments::Column::ReviewId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn get(&self, review_id: i32) -> Result<Option<Judgment>> {
        let row = Judgments::find_by_id(review_id).one(&self.conn).await?;
        Ok(row.map(Self::map_row))
    }

    /// Rating/verdict rows for every review of the movie with a Complete
    /// judgment, for the scoring engine and the report aggregates.
    pub async fn judged_rows_for(&self, movie_id: i32) -> Result<Vec<JudgedReviewRow>> {
        let complete: Vec<judgments::Model> = Judgments::find()
            .filter(judgments::Column::MovieId.eq(movie_id))
            .filter(judgments::Column::IsAuthentic.is_not_null())
            .filter(judgments::Column::QualityScore.is_not_null())
            .all(&self.conn)
            .await?;

        if complete.is_empty() {
            return Ok(Vec::new());
        }

        let ratings: HashMap<i32, Option<f64>> = Reviews::find()
            .filter(reviews::Column::MovieId.eq(movie_id))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|r| (r.id, r.original_rating))
            .collect();

        Ok(complete
            .into_iter()
            .filter_map(|j| {
                let (Some(is_authentic), Some(quality_score)) = (j.is_authentic, j.quality_score)
                else {
                    return None;
                };
                Some(JudgedReviewRow {
                    original_rating: ratings.get(&j.review_id).copied().flatten(),
                    quality_score,
                    is_authentic,
                })
            })
            .collect())
    }

    fn map_row(row: judgments::Model) -> Judgment {
        match (row.is_authentic, row.quality_score) {
            (Some(is_authentic), Some(quality_score)) => Judgment::Complete(JudgeVerdict {
                is_authentic,
                quality_score,
                reasoning: row.reasoning.unwrap_or_default(),
            }),
            _ => Judgment::Pending,
        }
    }
}
