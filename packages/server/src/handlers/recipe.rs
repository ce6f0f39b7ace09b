use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::media::decode_data_uri;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, actor_id};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::recipe::*;
use crate::models::shared::{Pagination, prefix_pattern};
use crate::state::AppState;
use crate::utils::recipe::{
    delete_recipe_dependents, ensure_references_exist, find_recipe, find_recipe_for_update,
    insert_composition, recipe_response, recipe_responses, release_image, require_author,
};

/// Recipes matching `filter` as seen by `actor`. Flags that need a caller are
/// ignored for anonymous requests.
pub(crate) fn filtered_recipes(filter: &RecipeFilter, actor: Option<i32>) -> Select<recipe::Entity> {
    let mut select = recipe::Entity::find();

    if !filter.tag_slugs.is_empty() {
        select = select.filter(
            recipe::Column::Id.in_subquery(
                SeaQuery::select()
                    .column((recipe_tag::Entity, recipe_tag::Column::RecipeId))
                    .from(recipe_tag::Entity)
                    .inner_join(
                        tag::Entity,
                        Expr::col((tag::Entity, tag::Column::Id))
                            .equals((recipe_tag::Entity, recipe_tag::Column::TagId)),
                    )
                    .and_where(tag::Column::Slug.is_in(filter.tag_slugs.iter().cloned()))
                    .to_owned(),
            ),
        );
    }

    if let Some(author) = filter.author {
        select = select.filter(recipe::Column::AuthorId.eq(author));
    }

    if let Some(actor) = actor {
        if filter.favorited_only {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(favorite::Column::RecipeId)
                        .from(favorite::Entity)
                        .and_where(favorite::Column::UserId.eq(actor))
                        .to_owned(),
                ),
            );
        }
        if filter.in_cart_only {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(shopping_cart::Column::RecipeId)
                        .from(shopping_cart::Entity)
                        .and_where(shopping_cart::Column::UserId.eq(actor))
                        .to_owned(),
                ),
            );
        }
    }

    if let Some(pattern) = filter.name.as_deref().and_then(prefix_pattern) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((recipe::Entity, recipe::Column::Name))))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    select
}

/// Run a filtered recipe query for one page and assemble the payloads.
pub(crate) async fn recipe_page(
    state: &AppState,
    actor: Option<i32>,
    filter: &RecipeFilter,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<RecipeListResponse, AppError> {
    let (page, per_page) = state.config.pagination.resolve(page, limit);
    let select = filtered_recipes(filter, actor);

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let recipes = select
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = recipe_responses(&state.db, &state.config.media, actor, recipes).await?;
    Ok(RecipeListResponse { data, pagination })
}

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes with filters",
    description = "Newest first. `tags` may repeat or hold comma-separated slugs; a recipe matches when it carries any of them. `is_favorited` and `is_in_shopping_cart` only apply when a token is sent.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = RecipeListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_recipes(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RecipeListQuery>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let filter = RecipeFilter::from_query(&query)?;
    let page = recipe_page(&state, actor_id(&auth_user), &filter, query.page, query.limit).await?;
    Ok(Json(page))
}

async fn insert_recipe(
    state: &AppState,
    author_id: i32,
    payload: &RecipeWriteRequest,
    image_key: &str,
) -> Result<recipe::Model, AppError> {
    ensure_references_exist(&state.db, &payload.ingredients, &payload.tags).await?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let model = recipe::ActiveModel {
        author_id: Set(author_id),
        name: Set(payload.name.trim().to_string()),
        text: Set(payload.text.clone()),
        cooking_time: Set(payload.cooking_time),
        image: Set(image_key.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_composition(&txn, model.id, &payload.ingredients, &payload.tags).await?;
    txn.commit().await?;
    Ok(model)
}

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Create a recipe",
    description = "The caller becomes the author. `image` is a base64 data URI and is required.",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_recipe_write(&payload, true)?;

    let image_uri = payload.image.as_deref().unwrap_or_default();
    let image = decode_data_uri(image_uri, state.config.media.max_image_size)?;
    let image_key = state.media.put(&image).await?.to_string();

    let model = match insert_recipe(&state, auth_user.user_id, &payload, &image_key).await {
        Ok(model) => model,
        Err(e) => {
            release_image(&state.db, state.media.as_ref(), &image_key).await;
            return Err(e);
        }
    };

    tracing::info!(recipe_id = model.id, "Recipe created");
    let body = recipe_response(
        &state.db,
        &state.config.media,
        Some(auth_user.user_id),
        model,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_recipe(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let model = find_recipe(&state.db, id).await?;
    let body = recipe_response(&state.db, &state.config.media, actor_id(&auth_user), model).await?;
    Ok(Json(body))
}

/// Replace a recipe's fields and composition in one locked transaction.
async fn apply_replacement(
    state: &AppState,
    user_id: i32,
    id: i32,
    payload: RecipeWriteRequest,
    new_image: Option<&str>,
) -> Result<(recipe::Model, String), AppError> {
    let txn = state.db.begin().await?;
    let existing = find_recipe_for_update(&txn, id).await?;
    require_author(user_id, &existing)?;
    ensure_references_exist(&txn, &payload.ingredients, &payload.tags).await?;

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    insert_composition(&txn, id, &payload.ingredients, &payload.tags).await?;

    let old_image = existing.image.clone();
    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.text = Set(payload.text);
    active.cooking_time = Set(payload.cooking_time);
    if let Some(key) = new_image {
        active.image = Set(key.to_string());
    }
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok((model, old_image))
}

async fn replace_recipe(
    auth_user: AuthUser,
    state: AppState,
    id: i32,
    payload: RecipeWriteRequest,
) -> Result<Json<RecipeResponse>, AppError> {
    validate_recipe_write(&payload, false)?;

    let new_image = match payload.image.as_deref().map(str::trim) {
        Some(uri) if !uri.is_empty() => {
            let image = decode_data_uri(uri, state.config.media.max_image_size)?;
            Some(state.media.put(&image).await?.to_string())
        }
        _ => None,
    };

    let replaced =
        apply_replacement(&state, auth_user.user_id, id, payload, new_image.as_deref()).await;
    let (model, old_image) = match replaced {
        Ok(replaced) => replaced,
        Err(e) => {
            if let Some(key) = &new_image {
                release_image(&state.db, state.media.as_ref(), key).await;
            }
            return Err(e);
        }
    };

    if new_image.as_deref().is_some_and(|key| key != old_image) {
        release_image(&state.db, state.media.as_ref(), &old_image).await;
    }

    let body = recipe_response(
        &state.db,
        &state.config.media,
        Some(auth_user.user_id),
        model,
    )
    .await?;
    Ok(Json(body))
}

#[utoipa::path(
    put,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Replace a recipe",
    description = "Author only. Tags and ingredients are replaced as a whole; the current image is kept when `image` is omitted.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    replace_recipe(auth_user, state, id, payload).await
}

#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "patchRecipe",
    summary = "Replace a recipe (PATCH alias)",
    description = "Same body and semantics as PUT.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn patch_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    replace_recipe(auth_user, state, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Author only. Removes the recipe together with its tags, ingredients, favorites and cart entries.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_recipe_for_update(&txn, id).await?;
    require_author(auth_user.user_id, &existing)?;

    delete_recipe_dependents(&txn, &[id]).await?;
    recipe::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    release_image(&state.db, state.media.as_ref(), &existing.image).await;
    tracing::info!(recipe_id = id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
