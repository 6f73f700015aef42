use breeze_entity_derive::breeze_entity;
use sea_orm::entity::prelude::*;

/// Password reset and email verification tokens. `identifier` is the email
/// the token was issued for.
#[breeze_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(unique)]
    pub token: String,
    #[sea_orm(indexed)]
    pub identifier: String,
    pub kind: String,
    pub expires_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}
