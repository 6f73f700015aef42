use breeze_entity_derive::breeze_entity;
use sea_orm::entity::prelude::*;

#[breeze_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(has_many)]
    pub user_roles: HasMany<super::user_role::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
