use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::clients::judge::ReviewJudge;
use crate::db::Store;
use crate::models::judgment::JudgeVerdict;
use anyhow::Result;
use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

/// How judge calls are driven over the pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// One call at a time with a fixed pause between calls.
    Serial,
    /// Bounded worker pool, results inserted as they land. No record of
    /// dispatched-but-unfinished work survives a crash.
    Unordered,
    /// Bounded worker pool behind a placeholder pre-pass, so an interrupted
    /// run leaves an inspectable Pending/Complete trail and can resume.
    Ordered,
}

impl FromStr for AnalysisMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "serial" => Ok(Self::Serial),
            "unordered" => Ok(Self::Unordered),
            "ordered" => Ok(Self::Ordered),
            other => anyhow::bail!("unknown analysis mode '{other}' (serial|unordered|ordered)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub mode: AnalysisMode,
    pub max_concurrent: usize,
    pub serial_delay: Duration,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Ordered,
            max_concurrent: 5,
            serial_delay: Duration::from_millis(200),
        }
    }
}

/// Per-run analysis tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisStats {
    pub analyzed: usize,
    pub total_pending: usize,
}

/// Obtains a judgment for every review of a movie that lacks a Complete one.
///
/// A failing judge call never aborts the batch: the worker records the fixed
/// fallback verdict and moves on. Reviews already judged are excluded by the
/// pending query, so re-running is a no-op for them.
pub struct AnalysisService {
    store: Store,
    judge: Arc<dyn ReviewJudge>,
    options: AnalysisOptions,
}

impl AnalysisService {
    pub fn new(store: Store, judge: Arc<dyn ReviewJudge>, options: AnalysisOptions) -> Self {
        Self {
            store,
            judge,
            options,
        }
    }

    pub async fn analyze_movie(&self, movie_id: i32) -> Result<AnalysisStats> {
        let pending = self.store.pending_reviews_for(movie_id).await?;
        let total_pending = pending.len();

        if pending.is_empty() {
            info!("No reviews awaiting judgment for movie {}", movie_id);
            return Ok(AnalysisStats {
                analyzed: 0,
                total_pending: 0,
            });
        }

        info!(
            "Analyzing {} reviews for movie {} ({:?} mode)",
            total_pending, movie_id, self.options.mode
        );

        match self.options.mode {
            AnalysisMode::Serial => self.run_serial(movie_id, pending).await?,
            AnalysisMode::Unordered => self.run_pooled(movie_id, pending, false).await?,
            AnalysisMode::Ordered => self.run_pooled(movie_id, pending, true).await?,
        }

        info!(
            "Judgment pass complete: {} reviews analyzed for movie {}",
            total_pending, movie_id
        );

        Ok(AnalysisStats {
            analyzed: total_pending,
            total_pending,
        })
    }

    async fn run_serial(&self, movie_id: i32, pending: Vec<(i32, String)>) -> Result<()> {
        for (review_id, text) in pending {
            judge_one(&self.store, &*self.judge, movie_id, review_id, &text, false).await?;
            tokio::time::sleep(self.options.serial_delay).await;
        }
        Ok(())
    }

    async fn run_pooled(
        &self,
        movie_id: i32,
        pending: Vec<(i32, String)>,
        preallocate: bool,
    ) -> Result<()> {
        if preallocate {
            // Ascending-id placeholder pass; the only ordering the pool
            // guarantees. Insert-if-absent, so resumed runs are safe.
            for (review_id, _) in &pending {
                self.store.mark_judgment_pending(*review_id, movie_id).await?;
            }
            debug!("Wrote {} judgment placeholders", pending.len());
        }

        let results: Vec<Result<()>> = stream::iter(pending.into_iter().map(|(review_id, text)| {
            let store = self.store.clone();
            let judge = Arc::clone(&self.judge);
            async move {
                judge_one(&store, &*judge, movie_id, review_id, &text, preallocate).await
            }
        }))
        .buffer_unordered(self.options.max_concurrent)
        .collect()
        .await;

        // Only storage failures surface here; judge failures were absorbed.
        results.into_iter().collect::<Result<Vec<()>>>()?;

        Ok(())
    }
}

/// One review's read-judge-write cycle. Owns no state shared with other
/// workers beyond the pooled store handle.
async fn judge_one(
    store: &Store,
    judge: &dyn ReviewJudge,
    movie_id: i32,
    review_id: i32,
    text: &str,
    preallocated: bool,
) -> Result<()> {
    let verdict = match judge.judge(text).await {
        Ok(verdict) => verdict,
        Err(err) => {
            warn!(
                "Judge call failed for review {}: {}; recording fallback verdict",
                review_id, err
            );
            JudgeVerdict::fallback()
        }
    };

    if preallocated {
        store.complete_judgment(review_id, &verdict).await
    } else {
        store.insert_judgment(review_id, movie_id, &verdict).await
    }
}
