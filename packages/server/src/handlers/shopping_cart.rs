use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{recipe_ingredient, shopping_cart};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::recipe::ShortRecipeResponse;
use crate::models::shopping_list;
use crate::state::AppState;
use crate::utils::recipe::{find_recipe, ingredients_by_id};
use crate::utils::toggle::{expect_removed, map_insert_err};

#[utoipa::path(
    post,
    path = "/recipes/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "addToShoppingCart",
    summary = "Put a recipe in the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already in the cart (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn add_to_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    shopping_cart::ActiveModel {
        user_id: Set(auth_user.user_id),
        recipe_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&state.db)
    .await
    .map_err(|e| map_insert_err(e, "Recipe is already in the shopping cart"))?;

    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::new(recipe, &state.config.media)),
    ))
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "removeFromShoppingCart",
    summary = "Take a recipe out of the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found or not in the cart (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn remove_from_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    find_recipe(&state.db, id).await?;

    let result = shopping_cart::Entity::delete_many()
        .filter(shopping_cart::Column::UserId.eq(auth_user.user_id))
        .filter(shopping_cart::Column::RecipeId.eq(id))
        .exec(&state.db)
        .await?;
    expect_removed(result, "Recipe is not in the shopping cart")?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/recipes/download_shopping_cart",
    tag = "Shopping Cart",
    operation_id = "downloadShoppingCart",
    summary = "Download the aggregated shopping list",
    description = "Plain-text attachment. Amounts of the same ingredient and unit across all recipes in the cart are summed.",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_shopping_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let lines: Vec<(i32, i32)> = recipe_ingredient::Entity::find()
        .filter(
            recipe_ingredient::Column::RecipeId.in_subquery(
                SeaQuery::select()
                    .column(shopping_cart::Column::RecipeId)
                    .from(shopping_cart::Entity)
                    .and_where(shopping_cart::Column::UserId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        )
        .select_only()
        .column(recipe_ingredient::Column::IngredientId)
        .column(recipe_ingredient::Column::Amount)
        .into_tuple()
        .all(&state.db)
        .await?;

    let ingredients = ingredients_by_id(&state.db, lines.iter().map(|(id, _)| *id)).await?;
    let rows = lines.into_iter().filter_map(|(id, amount)| {
        ingredients
            .get(&id)
            .map(|i| (i.name.clone(), i.measurement_unit.clone(), amount))
    });
    let body = shopping_list::render(&shopping_list::aggregate(rows));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", shopping_list::FILENAME),
            ),
        ],
        body,
    ))
}
