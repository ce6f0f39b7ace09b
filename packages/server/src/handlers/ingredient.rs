use axum::Json;
use axum::extract::{Path, State};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::ingredient;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::ingredient::{IngredientListQuery, IngredientResponse};
use crate::models::shared::prefix_pattern;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/ingredients",
    tag = "Ingredients",
    operation_id = "listIngredients",
    summary = "List ingredients",
    description = "Ordered by name. `name` matches a case-insensitive prefix; `measurement_unit` matches exactly. Not paginated.",
    params(IngredientListQuery),
    responses(
        (status = 200, description = "Ingredients", body = Vec<IngredientResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IngredientListQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let mut select = ingredient::Entity::find();

    if let Some(pattern) = query.name.as_deref().and_then(prefix_pattern) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(ingredient::Column::Name)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }
    if let Some(unit) = query.measurement_unit.as_deref().map(str::trim)
        && !unit.is_empty()
    {
        select = select.filter(ingredient::Column::MeasurementUnit.eq(unit));
    }

    let rows = select
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(IngredientResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/ingredients/{id}",
    tag = "Ingredients",
    operation_id = "getIngredient",
    summary = "Get an ingredient by ID",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let model = ingredient::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".into()))?;
    Ok(Json(model.into()))
}
