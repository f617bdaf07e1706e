use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Movie entity. Soft-deleted like users; posters live in storage and the
/// row only carries the public URL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "movies")]
#[schema(as = Movie)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub overview: String,

    pub rating: f32,

    pub age_rating: String,

    pub genre_id: i32,

    pub release_date: NaiveDate,

    /// Runtime in minutes
    pub runtime: i32,

    pub casters: String,
    pub director: String,
    pub writer: String,

    pub is_premium: bool,

    pub poster_url: String,
    pub trailer_url: String,
    pub video_url: String,

    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::genre::Entity",
        from = "Column::GenreId",
        to = "super::genre::Column::Id"
    )]
    Genre,
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genre.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
