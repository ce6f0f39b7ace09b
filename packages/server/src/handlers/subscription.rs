use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{recipe, subscription, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::recipe::ShortRecipeResponse;
use crate::models::shared::Pagination;
use crate::models::subscription::{
    SubscriptionListResponse, SubscriptionQuery, SubscriptionResponse, group_previews,
};
use crate::state::AppState;
use crate::utils::recipe::find_user;
use crate::utils::toggle::{expect_removed, map_insert_err};

/// Build subscription payloads for `authors`, all of whom the caller follows.
async fn subscription_responses(
    state: &AppState,
    authors: Vec<user::Model>,
    recipes_limit: Option<u64>,
) -> Result<Vec<SubscriptionResponse>, AppError> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }
    let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let totals: HashMap<i32, u64> = recipe::Entity::find()
        .select_only()
        .column(recipe::Column::AuthorId)
        .column_as(recipe::Column::Id.count(), "recipes_count")
        .filter(recipe::Column::AuthorId.is_in(author_ids.iter().copied()))
        .group_by(recipe::Column::AuthorId)
        .into_tuple::<(i32, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(author_id, n)| (author_id, n as u64))
        .collect();

    let recipes = match recipes_limit {
        Some(0) => Vec::new(),
        limit => {
            let mut select =
                recipe::Entity::find().filter(recipe::Column::AuthorId.is_in(author_ids));
            // Keep a recipe only when fewer than `limit` newer ones share its author.
            if let Some(limit) = limit {
                select = select.filter(Expr::cust(format!(
                    "(SELECT COUNT(*) FROM \"recipe\" AS \"newer\" \
                     WHERE \"newer\".\"author_id\" = \"recipe\".\"author_id\" \
                     AND (\"newer\".\"created_at\", \"newer\".\"id\") > (\"recipe\".\"created_at\", \"recipe\".\"id\")) < {limit}"
                )));
            }
            select
                .order_by_desc(recipe::Column::CreatedAt)
                .order_by_desc(recipe::Column::Id)
                .all(&state.db)
                .await?
        }
    };

    let mut previews = group_previews(
        recipes.into_iter().map(|r| (r.author_id, r)),
        &totals,
        recipes_limit,
    );

    Ok(authors
        .into_iter()
        .map(|author| {
            let preview = previews.remove(&author.id).unwrap_or_default();
            let recipes = preview
                .items
                .into_iter()
                .map(|r| ShortRecipeResponse::new(r, &state.config.media))
                .collect();
            SubscriptionResponse::new(author, true, recipes, preview.total)
        })
        .collect())
}

async fn subscription_page(
    auth_user: AuthUser,
    state: AppState,
    query: SubscriptionQuery,
) -> Result<Json<SubscriptionListResponse>, AppError> {
    let (page, per_page) = state.config.pagination.resolve(query.page, query.limit);
    let select = user::Entity::find().filter(
        user::Column::Id.in_subquery(
            SeaQuery::select()
                .column(subscription::Column::AuthorId)
                .from(subscription::Entity)
                .and_where(subscription::Column::UserId.eq(auth_user.user_id))
                .to_owned(),
        ),
    );

    let total = select.clone().count(&state.db).await?;
    let pagination = Pagination::new(page, per_page, total);

    let authors = select
        .order_by_asc(user::Column::Id)
        .offset(Some(pagination.offset()))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = subscription_responses(&state, authors, query.recipes_limit).await?;
    Ok(Json(SubscriptionListResponse { data, pagination }))
}

#[utoipa::path(
    get,
    path = "/users/subscriptions",
    tag = "Subscriptions",
    operation_id = "listSubscriptions",
    summary = "List authors the caller follows",
    description = "Each author carries their newest recipes, truncated to `recipes_limit`, and the full `recipes_count`.",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Followed authors", body = SubscriptionListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_subscriptions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SubscriptionQuery>,
) -> Result<Json<SubscriptionListResponse>, AppError> {
    subscription_page(auth_user, state, query).await
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "Subscriptions",
    operation_id = "listSubscriptionsShort",
    summary = "List authors the caller follows (short path)",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Followed authors", body = SubscriptionListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_subscriptions_short(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SubscriptionQuery>,
) -> Result<Json<SubscriptionListResponse>, AppError> {
    subscription_page(auth_user, state, query).await
}

fn reject_self(auth_user: &AuthUser, author_id: i32) -> Result<(), AppError> {
    if auth_user.user_id == author_id {
        return Err(AppError::Validation(
            "You cannot subscribe to yourself".into(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/users/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "subscribe",
    summary = "Follow an author",
    params(
        ("id" = i32, Path, description = "Author user ID"),
        SubscriptionQuery,
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Self-subscription (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already subscribed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id, user_id = auth_user.user_id))]
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<SubscriptionQuery>,
) -> Result<impl IntoResponse, AppError> {
    reject_self(&auth_user, id)?;
    let author = find_user(&state.db, id).await?;

    subscription::ActiveModel {
        user_id: Set(auth_user.user_id),
        author_id: Set(id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&state.db)
    .await
    .map_err(|e| map_insert_err(e, "Already subscribed to this author"))?;

    let body = subscription_responses(&state, vec![author], query.recipes_limit)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Subscription response assembly returned nothing".into()))?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "unsubscribe",
    summary = "Stop following an author",
    params(("id" = i32, Path, description = "Author user ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Self-subscription (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found or not subscribed (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn unsubscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    reject_self(&auth_user, id)?;
    find_user(&state.db, id).await?;

    let result = subscription::Entity::delete_many()
        .filter(subscription::Column::UserId.eq(auth_user.user_id))
        .filter(subscription::Column::AuthorId.eq(id))
        .exec(&state.db)
        .await?;
    expect_removed(result, "Not subscribed to this author")?;

    Ok(StatusCode::NO_CONTENT)
}
