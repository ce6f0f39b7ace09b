//! Per-caller booleans shown on recipe and user payloads.
//!
//! Each function answers for a whole page of targets in one query. Anonymous
//! callers get an empty set.

use std::collections::HashSet;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entity::{favorite, shopping_cart, subscription};

/// IDs among `recipe_ids` that `actor` has favorited.
pub async fn favorited_by<C: ConnectionTrait>(
    db: &C,
    actor: Option<i32>,
    recipe_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(actor) = actor else {
        return Ok(HashSet::new());
    };
    if recipe_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(actor))
        .filter(favorite::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .select_only()
        .column(favorite::Column::RecipeId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// IDs among `recipe_ids` that sit in `actor`'s shopping cart.
pub async fn in_cart_of<C: ConnectionTrait>(
    db: &C,
    actor: Option<i32>,
    recipe_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(actor) = actor else {
        return Ok(HashSet::new());
    };
    if recipe_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = shopping_cart::Entity::find()
        .filter(shopping_cart::Column::UserId.eq(actor))
        .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .select_only()
        .column(shopping_cart::Column::RecipeId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

/// IDs among `author_ids` that `actor` follows.
pub async fn subscribed_by<C: ConnectionTrait>(
    db: &C,
    actor: Option<i32>,
    author_ids: &[i32],
) -> Result<HashSet<i32>, DbErr> {
    let Some(actor) = actor else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(actor))
        .filter(subscription::Column::AuthorId.is_in(author_ids.iter().copied()))
        .select_only()
        .column(subscription::Column::AuthorId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}
