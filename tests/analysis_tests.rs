//! Orchestration behavior with a scripted judge: all three modes, fallback on
//! judge failure, crash resumability, and end-to-end pipeline numbers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reelscore::clients::judge::{JudgeError, ReviewJudge};
use reelscore::db::{ReviewOutcome, Store};
use reelscore::models::judgment::{Judgment, JudgeVerdict};
use reelscore::models::review::RawReview;
use reelscore::services::{
    AnalysisMode, AnalysisOptions, AnalysisService, PipelineService, ScoringService,
};

async fn temp_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("reelscore-test-{}.db", uuid::Uuid::new_v4()));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test store")
}

fn review(text: &str, rating: Option<f64>) -> RawReview {
    RawReview {
        text: text.to_string(),
        rating,
        username: Some(format!("user-{}", text.len())),
        date: "Jan 1, 2024".to_string(),
    }
}

fn verdict(is_authentic: bool, quality_score: f64) -> JudgeVerdict {
    JudgeVerdict {
        is_authentic,
        quality_score,
        reasoning: "scripted".to_string(),
    }
}

/// Judge double: answers from a script keyed on review text, errors when the
/// text carries the failure marker, and counts every call.
struct MockJudge {
    verdicts: HashMap<String, JudgeVerdict>,
    calls: AtomicUsize,
}

const FAILURE_MARKER: &str = "[judge-unreachable]";

impl MockJudge {
    fn scripted(entries: &[(&str, JudgeVerdict)]) -> Self {
        Self {
            verdicts: entries
                .iter()
                .map(|(text, v)| ((*text).to_string(), v.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn approving() -> Self {
        Self::scripted(&[])
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewJudge for MockJudge {
    async fn judge(&self, review_text: &str) -> Result<JudgeVerdict, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if review_text.contains(FAILURE_MARKER) {
            return Err(JudgeError::Payload("scripted transport failure".to_string()));
        }

        Ok(self
            .verdicts
            .get(review_text)
            .cloned()
            .unwrap_or_else(|| verdict(true, 0.8)))
    }
}

fn options(mode: AnalysisMode) -> AnalysisOptions {
    AnalysisOptions {
        mode,
        max_concurrent: 3,
        serial_delay: Duration::ZERO,
    }
}

async fn seed_reviews(store: &Store, title: &str, reviews: &[RawReview]) -> (i32, Vec<i32>) {
    let movie_id = store.upsert_movie(title, "url").await.unwrap();
    let mut ids = Vec::new();
    for r in reviews {
        match store.insert_review_if_new(movie_id, r).await.unwrap() {
            ReviewOutcome::Inserted(id) => ids.push(id),
            ReviewOutcome::Duplicate => panic!("seed review duplicated"),
        }
    }
    (movie_id, ids)
}

#[tokio::test]
async fn every_mode_judges_all_pending_reviews() {
    for mode in [
        AnalysisMode::Serial,
        AnalysisMode::Unordered,
        AnalysisMode::Ordered,
    ] {
        let store = temp_store().await;
        let reviews = [
            review("an actual essay", Some(5.0)),
            review("meh", Some(2.0)),
            review("unrated but wordy", None),
        ];
        let (movie_id, ids) = seed_reviews(&store, "Mode Movie", &reviews).await;

        let judge = Arc::new(MockJudge::approving());
        let stats = AnalysisService::new(store.clone(), judge.clone(), options(mode))
            .analyze_movie(movie_id)
            .await
            .unwrap();

        assert_eq!(stats.analyzed, 3, "mode {mode:?}");
        assert_eq!(stats.total_pending, 3, "mode {mode:?}");
        assert_eq!(judge.call_count(), 3, "mode {mode:?}");

        for id in ids {
            let judgment = store.judgment_for(id).await.unwrap().unwrap();
            assert!(judgment.is_complete(), "mode {mode:?}, review {id}");
        }
        assert!(store.pending_reviews_for(movie_id).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn rerun_does_not_rejudge_completed_reviews() {
    let store = temp_store().await;
    let (movie_id, _) = seed_reviews(
        &store,
        "Rerun Movie",
        &[review("first", Some(4.0)), review("second", Some(1.0))],
    )
    .await;

    let judge = Arc::new(MockJudge::approving());
    let service = AnalysisService::new(store.clone(), judge.clone(), options(AnalysisMode::Ordered));

    service.analyze_movie(movie_id).await.unwrap();
    let stats = service.analyze_movie(movie_id).await.unwrap();

    assert_eq!(stats.total_pending, 0);
    assert_eq!(judge.call_count(), 2);
}

#[tokio::test]
async fn judge_failure_records_the_fallback_verdict() {
    let store = temp_store().await;
    let failing_text = format!("great movie {FAILURE_MARKER}");
    let (movie_id, ids) = seed_reviews(
        &store,
        "Fallback Movie",
        &[review(&failing_text, Some(5.0))],
    )
    .await;

    let judge = Arc::new(MockJudge::approving());
    let stats = AnalysisService::new(store.clone(), judge, options(AnalysisMode::Ordered))
        .analyze_movie(movie_id)
        .await
        .unwrap();

    // The failure is absorbed, the review still counts as analyzed.
    assert_eq!(stats.analyzed, 1);

    match store.judgment_for(ids[0]).await.unwrap().unwrap() {
        Judgment::Complete(v) => {
            assert!(!v.is_authentic);
            assert_eq!(v.quality_score, 0.1);
        }
        Judgment::Pending => panic!("fallback verdict was not recorded"),
    }

    // Zero weight everywhere -> sanitized score is exactly 0, not absent.
    let sanitized = ScoringService::new(store)
        .sanitized_score(movie_id)
        .await
        .unwrap();
    assert_eq!(sanitized, 0.0);
}

#[tokio::test]
async fn interrupted_ordered_run_resumes_without_duplicates() {
    let store = temp_store().await;
    let (movie_id, ids) = seed_reviews(
        &store,
        "Crash Movie",
        &[
            review("finished before the crash", Some(4.0)),
            review("was in flight", Some(3.0)),
            review("never dispatched", Some(2.0)),
        ],
    )
    .await;

    // Simulate a run that wrote all placeholders but only finished the first
    // review before dying.
    for &id in &ids {
        store.mark_judgment_pending(id, movie_id).await.unwrap();
    }
    store
        .complete_judgment(ids[0], &verdict(true, 0.9))
        .await
        .unwrap();

    let judge = Arc::new(MockJudge::approving());
    let stats = AnalysisService::new(store.clone(), judge.clone(), options(AnalysisMode::Ordered))
        .analyze_movie(movie_id)
        .await
        .unwrap();

    // Only the two unfinished reviews are picked up again.
    assert_eq!(stats.total_pending, 2);
    assert_eq!(judge.call_count(), 2);

    for &id in &ids {
        assert!(store.judgment_for(id).await.unwrap().unwrap().is_complete());
    }

    // The pre-crash verdict survived untouched.
    match store.judgment_for(ids[0]).await.unwrap().unwrap() {
        Judgment::Complete(v) => assert_eq!(v.quality_score, 0.9),
        Judgment::Pending => panic!("pre-crash judgment lost"),
    }
}

#[tokio::test]
async fn pipeline_end_to_end_produces_expected_scores() {
    let store = temp_store().await;

    let thoughtful = "a genuinely thoughtful appreciation of the film";
    let terse = "it was fine i guess";
    let bomb = "0 stars this franchise is ruined forever";

    let judge = Arc::new(MockJudge::scripted(&[
        (thoughtful, verdict(true, 1.0)),
        (terse, verdict(true, 0.2)),
        (bomb, verdict(false, 0.9)),
    ]));

    let reviews = [
        review(thoughtful, Some(5.0)),
        review(terse, Some(1.0)),
        review(bomb, Some(1.0)),
    ];

    let summary = PipelineService::new(store.clone(), judge, options(AnalysisMode::Ordered))
        .run("Scored Movie", "url", &reviews)
        .await
        .unwrap();

    assert_eq!(summary.ingest.inserted, 3);
    assert_eq!(summary.ingest.duplicate, 0);
    assert_eq!(summary.analysis.analyzed, 3);

    let report = summary.report.expect("report should exist");
    // Weights 1.0, 0.2, 0 -> (5*1.0 + 1*0.2)/1.2 * 20 = 86.67
    assert_eq!(report.sanitized_score, 86.67);
    // One rating of three clears 3.5 -> 33.33
    assert_eq!(report.raw_score, Some(33.33));
    assert_eq!(report.total_reviews, 3);
    assert_eq!(report.authentic_count, 2);
    assert_eq!(report.inauthentic_count, 1);
    assert_eq!(report.mean_original_rating, Some(2.33));

    // A second identical scrape pass changes nothing.
    let judge = Arc::new(MockJudge::approving());
    let second = PipelineService::new(store, judge.clone(), options(AnalysisMode::Ordered))
        .run("Scored Movie", "url", &reviews)
        .await
        .unwrap();

    assert_eq!(second.ingest.inserted, 0);
    assert_eq!(second.ingest.duplicate, 3);
    assert_eq!(judge.call_count(), 0);
    assert_eq!(second.report.unwrap().sanitized_score, 86.67);
}

#[tokio::test]
async fn report_is_absent_for_unknown_movie() {
    let store = temp_store().await;
    let report = ScoringService::new(store).report("Never Stored").await.unwrap();
    assert!(report.is_none());
}

#[tokio::test]
async fn unrated_reviews_leave_raw_score_absent_but_sanitized_defined() {
    let store = temp_store().await;
    let (movie_id, _) = seed_reviews(
        &store,
        "Unrated Movie",
        &[review("no stars given", None), review("also unrated", None)],
    )
    .await;

    let judge = Arc::new(MockJudge::approving());
    AnalysisService::new(store.clone(), judge, options(AnalysisMode::Unordered))
        .analyze_movie(movie_id)
        .await
        .unwrap();

    let scoring = ScoringService::new(store);
    assert_eq!(scoring.raw_audience_score(movie_id).await.unwrap(), None);
    assert_eq!(scoring.sanitized_score(movie_id).await.unwrap(), 0.0);
}
