use crate::entities::{movies, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the movie if the title is unseen, otherwise returns the
    /// existing id. Title equality is exact-string; no normalization.
    pub async fn upsert(&self, title: &str, source_url: &str) -> Result<i32> {
        let active_model = movies::ActiveModel {
            title: Set(title.to_string()),
            source_url: Set(source_url.to_string()),
            added_at: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        };

        Movies::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(movies::Column::Title)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let row = Movies::find()
            .filter(movies::Column::Title.eq(title))
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("movie '{title}' missing after upsert"))?;

        debug!("Movie '{}' resolved to id {}", title, row.id);
        Ok(row.id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<movies::Model>> {
        Ok(Movies::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<movies::Model>> {
        Ok(Movies::find()
            .filter(movies::Column::Title.eq(title))
            .one(&self.conn)
            .await?)
    }

    pub async fn list(&self) -> Result<Vec<movies::Model>> {
        Ok(Movies::find()
            .order_by_asc(movies::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
