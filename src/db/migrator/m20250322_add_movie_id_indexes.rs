use sea_orm_migration::prelude::*;

/// Per-movie lookups (pending reviews, scoring reads) filter on `movie_id`;
/// without these every analysis pass scans both tables.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_movie_id")
                    .table(Reviews::Table)
                    .col(Reviews::MovieId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_judgments_movie_id")
                    .table(Judgments::Table)
                    .col(Judgments::MovieId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_judgments_movie_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reviews_movie_id").to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    MovieId,
}

#[derive(DeriveIden)]
enum Judgments {
    Table,
    MovieId,
}
