use breeze_entity_derive::breeze_entity;
use sea_orm::entity::prelude::*;

#[breeze_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(indexed)]
    pub user_id: Option<Uuid>,
    /// JSON encoded `SessionData`.
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub expires_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}
