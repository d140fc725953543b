use sea_orm::entity::prelude::*;

/// One judgment per review; the primary key doubles as the uniqueness
/// guarantee. Null score/flag fields mean the row is still a placeholder.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "judgments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub review_id: i32,
    /// Redundant with `reviews.movie_id`, kept for per-movie queries.
    pub movie_id: i32,
    pub is_authentic: Option<bool>,
    pub quality_score: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reasoning: Option<String>,
    pub judged_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reviews::Entity",
        from = "Column::ReviewId",
        to = "super::reviews::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Reviews,
    #[sea_orm(
        belongs_to = "super::movies::Entity",
        from = "Column::MovieId",
        to = "super::movies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Movies,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::movies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
