use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ingredient::IngredientAmountResponse;
use super::shared::{Pagination, ensure_unique_ids, parse_flag, validate_length};
use super::tag::TagResponse;
use super::user::UserResponse;
use crate::config::MediaConfig;
use crate::entity::recipe::{self, MAX_COOKING_TIME, MIN_COOKING_TIME};
use crate::entity::recipe_ingredient::{MAX_AMOUNT, MIN_AMOUNT};
use crate::error::AppError;

const MAX_RECIPE_NAME_LEN: usize = 200;

/// One ingredient line of a recipe write request.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct IngredientAmountInput {
    /// Ingredient ID.
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = 250)]
    pub amount: i32,
}

/// Body for creating a recipe and for replacing one (PUT or PATCH).
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RecipeWriteRequest {
    pub ingredients: Vec<IngredientAmountInput>,
    /// Tag IDs.
    #[serde(default)]
    #[schema(example = json!([1, 3]))]
    pub tags: Vec<i32>,
    /// `data:image/<png|jpeg|gif|webp>;base64,...`. Required on create; on
    /// update the current picture is kept when omitted.
    pub image: Option<String>,
    #[schema(example = "Boeuf bourguignon")]
    pub name: String,
    pub text: String,
    /// Minutes.
    #[schema(example = 90)]
    pub cooking_time: i32,
}

/// Checks that do not need the database. Existence of referenced ingredients
/// and tags is checked by the handler.
pub fn validate_recipe_write(
    payload: &RecipeWriteRequest,
    require_image: bool,
) -> Result<(), AppError> {
    if payload.ingredients.is_empty() {
        return Err(AppError::Validation(
            "A recipe needs at least one ingredient".into(),
        ));
    }
    for item in &payload.ingredients {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(AppError::Validation(format!(
                "Amount for ingredient {} must be between {MIN_AMOUNT} and {MAX_AMOUNT}",
                item.id
            )));
        }
    }
    ensure_unique_ids(payload.ingredients.iter().map(|i| i.id), "ingredient")?;
    ensure_unique_ids(payload.tags.iter().copied(), "tag")?;

    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&payload.cooking_time) {
        return Err(AppError::Validation(format!(
            "Cooking time must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME} minutes"
        )));
    }
    validate_length(&payload.name, "Name", MAX_RECIPE_NAME_LEN)?;
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("Text must not be empty".into()));
    }

    let has_image = payload
        .image
        .as_deref()
        .is_some_and(|img| !img.trim().is_empty());
    if require_image && !has_image {
        return Err(AppError::Validation("Image is required".into()));
    }
    Ok(())
}

/// Full recipe representation.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RecipeResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientAmountResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    #[schema(example = "Boeuf bourguignon")]
    pub name: String,
    /// Absolute image URL.
    #[schema(example = "http://localhost:3000/media/3f1c...e9.jpg")]
    pub image: String,
    pub text: String,
    #[schema(example = 90)]
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// Compact recipe representation used by toggles and subscriptions.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ShortRecipeResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Boeuf bourguignon")]
    pub name: String,
    pub image: String,
    #[schema(example = 90)]
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn new(recipe: recipe::Model, media: &MediaConfig) -> Self {
        Self {
            image: media.url_for(&recipe.image),
            id: recipe.id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeListResponse {
    pub data: Vec<RecipeResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Tag slugs; repeat the key or separate with commas. Any match counts.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author user ID.
    pub author: Option<i32>,
    /// `1`/`true` to keep only the caller's favorites.
    pub is_favorited: Option<String>,
    /// `1`/`true` to keep only recipes in the caller's shopping cart.
    pub is_in_shopping_cart: Option<String>,
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// Parsed recipe filter.
#[derive(Debug, Default, PartialEq)]
pub struct RecipeFilter {
    /// Distinct tag slugs. Empty means no tag restriction.
    pub tag_slugs: Vec<String>,
    pub author: Option<i32>,
    pub favorited_only: bool,
    pub in_cart_only: bool,
    pub name: Option<String>,
}

impl RecipeFilter {
    pub fn from_query(query: &RecipeListQuery) -> Result<Self, AppError> {
        Ok(Self {
            tag_slugs: parse_tag_slugs(&query.tags),
            author: query.author,
            favorited_only: parse_flag("is_favorited", query.is_favorited.as_deref())?,
            in_cart_only: parse_flag("is_in_shopping_cart", query.is_in_shopping_cart.as_deref())?,
            name: query.name.clone(),
        })
    }
}

/// Flatten `tags=a&tags=b,c` into distinct slugs, keeping first-seen order.
pub fn parse_tag_slugs(raw: &[String]) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for slug in raw.iter().flat_map(|v| v.split(',')).map(str::trim) {
        if !slug.is_empty() && !slugs.iter().any(|s| s == slug) {
            slugs.push(slug.to_string());
        }
    }
    slugs
}
