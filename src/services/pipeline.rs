use std::sync::Arc;

use crate::clients::judge::ReviewJudge;
use crate::db::Store;
use crate::models::report::MovieReport;
use crate::models::review::{IngestCounts, RawReview};
use crate::services::analysis::{AnalysisOptions, AnalysisService, AnalysisStats};
use crate::services::ingest::IngestService;
use crate::services::scoring::ScoringService;
use anyhow::Result;
use tracing::info;

/// Outcome of one full pipeline run over a batch of scraped reviews.
#[derive(Debug)]
pub struct RunSummary {
    pub movie_id: i32,
    pub ingest: IngestCounts,
    pub analysis: AnalysisStats,
    pub report: Option<MovieReport>,
}

/// Wires the stages end to end: persist raw reviews (deduped) -> judge
/// everything still pending -> score.
pub struct PipelineService {
    store: Store,
    judge: Arc<dyn ReviewJudge>,
    options: AnalysisOptions,
}

impl PipelineService {
    pub fn new(store: Store, judge: Arc<dyn ReviewJudge>, options: AnalysisOptions) -> Self {
        Self {
            store,
            judge,
            options,
        }
    }

    pub async fn run(
        &self,
        title: &str,
        source_url: &str,
        reviews: &[RawReview],
    ) -> Result<RunSummary> {
        let (movie_id, ingest) = IngestService::new(self.store.clone())
            .ingest(title, source_url, reviews)
            .await?;

        let analysis =
            AnalysisService::new(self.store.clone(), Arc::clone(&self.judge), self.options)
                .analyze_movie(movie_id)
                .await?;

        let report = ScoringService::new(self.store.clone()).report(title).await?;

        info!(
            "Pipeline finished for '{}': {} inserted, {} duplicates, {} analyzed",
            title, ingest.inserted, ingest.duplicate, analysis.analyzed
        );

        Ok(RunSummary {
            movie_id,
            ingest,
            analysis,
            report,
        })
    }
}
