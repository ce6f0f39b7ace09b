use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredient")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "name_unit")]
    pub name: String,
    #[sea_orm(unique_key = "name_unit")]
    pub measurement_unit: String,
}

impl ActiveModelBehavior for ActiveModel {}
