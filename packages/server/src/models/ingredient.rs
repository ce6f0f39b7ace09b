use serde::{Deserialize, Serialize};

use crate::entity::ingredient;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
    /// Exact measurement unit.
    pub measurement_unit: Option<String>,
}

/// An ingredient line of a recipe, with its amount.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IngredientAmountResponse {
    /// Ingredient ID.
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Flour")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
    #[schema(example = 250)]
    pub amount: i32,
}
