use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::favorite;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::handlers::recipe::recipe_page;
use crate::models::recipe::{RecipeFilter, RecipeListQuery, RecipeListResponse, ShortRecipeResponse};
use crate::state::AppState;
use crate::utils::recipe::find_recipe;
use crate::utils::toggle::{expect_removed, map_insert_err};

#[utoipa::path(
    post,
    path = "/recipes/{id}/favorite",
    tag = "Favorites",
    operation_id = "addFavorite",
    summary = "Add a recipe to favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already a favorite (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn add_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    favorite::ActiveModel {
        user_id: Set(auth_user.user_id),
        recipe_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&state.db)
    .await
    .map_err(|e| map_insert_err(e, "Recipe is already in favorites"))?;

    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::new(recipe, &state.config.media)),
    ))
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}/favorite",
    tag = "Favorites",
    operation_id = "removeFavorite",
    summary = "Remove a recipe from favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found or not a favorite (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn remove_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    find_recipe(&state.db, id).await?;

    let result = favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(auth_user.user_id))
        .filter(favorite::Column::RecipeId.eq(id))
        .exec(&state.db)
        .await?;
    expect_removed(result, "Recipe is not in favorites")?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/favourites",
    tag = "Favorites",
    operation_id = "listFavourites",
    summary = "List the caller's favorite recipes",
    description = "Same filters and pagination as the recipe list; `is_favorited` is implied.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Favorite recipes", body = RecipeListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_favourites(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RecipeListQuery>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let mut filter = RecipeFilter::from_query(&query)?;
    filter.favorited_only = true;
    let page = recipe_page(&state, Some(auth_user.user_id), &filter, query.page, query.limit).await?;
    Ok(Json(page))
}
