use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, recipe, shopping_cart, subscription, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, actor_id};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::Pagination;
use crate::models::user::{DeleteAccountRequest, UserListQuery, UserListResponse, UserResponse};
use crate::state::AppState;
use crate::utils::flags::subscribed_by;
use crate::utils::hash;
use crate::utils::recipe::{delete_recipe_dependents, find_user, release_image};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Paginated, ordered by ID. `is_subscribed` reflects the caller when a token is sent.",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let (page, per_page) = state.config.pagination.resolve(query.page, query.limit);
    let select = user::Entity::find();

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let users = select
        .order_by_asc(user::Column::Id)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscribed = subscribed_by(&state.db, actor_id(&auth_user), &ids).await?;

    let data = users
        .into_iter()
        .map(|u| {
            let is_subscribed = subscribed.contains(&u.id);
            UserResponse::new(u, is_subscribed)
        })
        .collect();

    Ok(Json(UserListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    operation_id = "getMe",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    // A token can outlive its account.
    let user = match find_user(&state.db, auth_user.user_id).await {
        Err(AppError::NotFound(_)) => return Err(AppError::TokenInvalid),
        other => other?,
    };
    Ok(Json(UserResponse::new(user, false)))
}

#[utoipa::path(
    delete,
    path = "/users/me",
    tag = "Users",
    operation_id = "deleteMe",
    summary = "Delete the caller's account",
    description = "Removes the account together with its recipes, favorites, shopping cart and subscriptions in both directions.",
    request_body = DeleteAccountRequest,
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Wrong current password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn delete_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<DeleteAccountRequest>,
) -> Result<StatusCode, AppError> {
    let me = auth_user.user_id;
    let txn = state.db.begin().await?;
    let user = user::Entity::find_by_id(me)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    if !hash::verify_password(&payload.current_password, &user.password) {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    let recipes = recipe::Entity::find()
        .filter(recipe::Column::AuthorId.eq(me))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    delete_recipe_dependents(&txn, &recipe_ids).await?;
    recipe::Entity::delete_many()
        .filter(recipe::Column::AuthorId.eq(me))
        .exec(&txn)
        .await?;

    favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(me))
        .exec(&txn)
        .await?;
    shopping_cart::Entity::delete_many()
        .filter(shopping_cart::Column::UserId.eq(me))
        .exec(&txn)
        .await?;
    subscription::Entity::delete_many()
        .filter(
            Condition::any()
                .add(subscription::Column::UserId.eq(me))
                .add(subscription::Column::AuthorId.eq(me)),
        )
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(me).exec(&txn).await?;
    txn.commit().await?;

    let mut images: Vec<String> = recipes.into_iter().map(|r| r.image).collect();
    images.sort();
    images.dedup();
    for key in &images {
        release_image(&state.db, state.media.as_ref(), key).await;
    }

    tracing::info!(recipes = recipe_ids.len(), "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    let is_subscribed = subscribed_by(&state.db, actor_id(&auth_user), &[id])
        .await?
        .contains(&id);
    Ok(Json(UserResponse::new(user, is_subscribed)))
}
