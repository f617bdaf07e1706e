use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pending email verification. At most one live row per user: re-issuing a
/// code replaces this row in place rather than inserting a second one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_verifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user; unique so a user can never hold two live codes
    #[sea_orm(unique)]
    pub user_id: Uuid,

    /// 4-digit code; unique so lookup-by-code is unambiguous
    #[sea_orm(unique)]
    pub code: String,

    /// Number of times the code was re-issued for this user
    pub resend_count: i32,

    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the code's 24-hour window has passed.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at < now
    }
}
