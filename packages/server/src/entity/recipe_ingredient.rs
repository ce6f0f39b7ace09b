use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Amount bounds for a single ingredient line.
pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 32_000;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredient")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "recipe_ingredient")]
    pub recipe_id: i32,
    #[sea_orm(belongs_to, from = "recipe_id", to = "id")]
    pub recipe: HasOne<super::recipe::Entity>,

    #[sea_orm(unique_key = "recipe_ingredient")]
    pub ingredient_id: i32,
    #[sea_orm(belongs_to, from = "ingredient_id", to = "id")]
    pub ingredient: HasOne<super::ingredient::Entity>,

    pub amount: i32,
}

impl ActiveModelBehavior for ActiveModel {}
