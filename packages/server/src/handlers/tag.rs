use axum::Json;
use axum::extract::{Path, State};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::tag;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::shared::prefix_pattern;
use crate::models::tag::{TagListQuery, TagResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/tags",
    tag = "Tags",
    operation_id = "listTags",
    summary = "List tags",
    description = "All tags ordered by name. Not paginated.",
    params(TagListQuery),
    responses(
        (status = 200, description = "Tags", body = Vec<TagResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_tags(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TagListQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let mut select = tag::Entity::find();
    if let Some(pattern) = query.name.as_deref().and_then(prefix_pattern) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(tag::Column::Name)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    let tags = select
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tags/{id}",
    tag = "Tags",
    operation_id = "getTag",
    summary = "Get a tag by ID",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let model = tag::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;
    Ok(Json(model.into()))
}
