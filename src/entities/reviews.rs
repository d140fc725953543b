use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_id: i32,
    #[sea_orm(column_type = "Text")]
    pub review_text: String,
    pub original_rating: Option<f64>,
    pub review_kind: String,
    pub username: String,
    pub review_date: String,
    /// Sole deduplication key; see `crate::fingerprint`.
    #[sea_orm(unique)]
    pub fingerprint: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movies::Entity",
        from = "Column::MovieId",
        to = "super::movies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Movies,
    #[sea_orm(has_one = "super::judgments::Entity")]
    Judgments,
}

impl Related<super::movies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movies.def()
    }
}

impl Related<super::judgments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Judgments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
