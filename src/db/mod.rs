use crate::entities::movies;
use crate::models::judgment::{Judgment, JudgeVerdict};
use crate::models::review::RawReview;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::judgment::JudgedReviewRow;
pub use repositories::review::ReviewOutcome;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn judgment_repo(&self) -> repositories::judgment::JudgmentRepository {
        repositories::judgment::JudgmentRepository::new(self.conn.clone())
    }

    pub async fn upsert_movie(&self, title: &str, source_url: &str) -> Result<i32> {
        self.movie_repo().upsert(title, source_url).await
    }

    pub async fn get_movie(&self, id: i32) -> Result<Option<movies::Model>> {
        self.movie_repo().get(id).await
    }

    pub async fn get_movie_by_title(&self, title: &str) -> Result<Option<movies::Model>> {
        self.movie_repo().get_by_title(title).await
    }

    pub async fn list_movies(&self) -> Result<Vec<movies::Model>> {
        self.movie_repo().list().await
    }

    pub async fn insert_review_if_new(
        &self,
        movie_id: i32,
        review: &RawReview,
    ) -> Result<ReviewOutcome> {
        self.review_repo().insert_if_new(movie_id, review).await
    }

    pub async fn pending_reviews_for(&self, movie_id: i32) -> Result<Vec<(i32, String)>> {
        self.review_repo().pending_for_movie(movie_id).await
    }

    pub async fn rated_ratings_for(&self, movie_id: i32) -> Result<Vec<f64>> {
        self.review_repo().rated_ratings_for(movie_id).await
    }

    pub async fn review_count_for(&self, movie_id: i32) -> Result<u64> {
        self.review_repo().count_for_movie(movie_id).await
    }

    pub async fn mark_judgment_pending(&self, review_id: i32, movie_id: i32) -> Result<()> {
        self.judgment_repo().mark_pending(review_id, movie_id).await
    }

    pub async fn complete_judgment(&self, review_id: i32, verdict: &JudgeVerdict) -> Result<()> {
        self.judgment_repo().complete(review_id, verdict).await
    }

    pub async fn insert_judgment(
        &self,
        review_id: i32,
        movie_id: i32,
        verdict: &JudgeVerdict,
    ) -> Result<()> {
        self.judgment_repo()
            .insert_complete(review_id, movie_id, verdict)
            .await
    }

    pub async fn judgment_for(&self, review_id: i32) -> Result<Option<Judgment>> {
        self.judgment_repo().get(review_id).await
    }

    pub async fn judged_rows_for(&self, movie_id: i32) -> Result<Vec<JudgedReviewRow>> {
        self.judgment_repo().judged_rows_for(movie_id).await
    }
}
