use std::collections::{BTreeSet, HashMap};

use common::media::{MediaKey, MediaStore};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, sea_query::LockType,
};

use crate::config::MediaConfig;
use crate::entity::{ingredient, recipe, recipe_ingredient, recipe_tag, tag, user};
use crate::error::AppError;
use crate::models::ingredient::IngredientAmountResponse;
use crate::models::recipe::{IngredientAmountInput, RecipeResponse};
use crate::models::tag::TagResponse;
use crate::models::user::UserResponse;
use crate::utils::flags::{favorited_by, in_cart_of, subscribed_by};

/// Look up a recipe by ID, returning 404 if not found.
pub async fn find_recipe<C: ConnectionTrait>(db: &C, id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

/// Like [`find_recipe`] but takes a row lock for the rest of the transaction.
pub async fn find_recipe_for_update<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

/// Only the author may modify a recipe.
pub fn require_author(user_id: i32, recipe: &recipe::Model) -> Result<(), AppError> {
    if recipe.author_id != user_id {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

/// Look up a user by ID, returning 404 if not found.
pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Reject ingredient or tag IDs that do not exist.
pub async fn ensure_references_exist<C: ConnectionTrait>(
    db: &C,
    ingredients: &[IngredientAmountInput],
    tags: &[i32],
) -> Result<(), AppError> {
    let wanted: BTreeSet<i32> = ingredients.iter().map(|i| i.id).collect();
    let found: BTreeSet<i32> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(wanted.iter().copied()))
        .select_only()
        .column(ingredient::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(AppError::Validation(format!(
            "Ingredient {missing} does not exist"
        )));
    }

    if tags.is_empty() {
        return Ok(());
    }
    let wanted: BTreeSet<i32> = tags.iter().copied().collect();
    let found: BTreeSet<i32> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(wanted.iter().copied()))
        .select_only()
        .column(tag::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(AppError::Validation(format!("Tag {missing} does not exist")));
    }
    Ok(())
}

/// Insert the tag and ingredient rows of a recipe. Callers replacing an
/// existing composition delete the old rows first, in the same transaction.
pub async fn insert_composition<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    ingredients: &[IngredientAmountInput],
    tags: &[i32],
) -> Result<(), AppError> {
    if !tags.is_empty() {
        recipe_tag::Entity::insert_many(tags.iter().map(|&tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(db)
        .await
        .map_err(composition_err)?;
    }

    recipe_ingredient::Entity::insert_many(ingredients.iter().map(|item| {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.id),
            amount: Set(item.amount),
            ..Default::default()
        }
    }))
    .exec_without_returning(db)
    .await
    .map_err(composition_err)?;
    Ok(())
}

/// A reference removed after [`ensure_references_exist`] ran surfaces as a
/// foreign key failure.
fn composition_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Validation("Unknown ingredient or tag".into())
        }
        _ => AppError::from(err),
    }
}

/// Drop a stored image once no recipe points at it. Failures are logged only;
/// the recipe change has already been committed.
pub async fn release_image<C: ConnectionTrait>(db: &C, media: &dyn MediaStore, key: &str) {
    let still_used = match recipe::Entity::find()
        .filter(recipe::Column::Image.eq(key))
        .count(db)
        .await
    {
        Ok(n) => n > 0,
        Err(e) => {
            tracing::warn!(%key, "Could not check image references: {e}");
            return;
        }
    };
    if still_used {
        return;
    }
    let Ok(parsed) = MediaKey::parse(key) else {
        tracing::warn!(%key, "Recipe referenced a malformed media key");
        return;
    };
    match media.delete(&parsed).await {
        Ok(true) => tracing::debug!(%key, "Released image"),
        Ok(false) => {}
        Err(e) => tracing::warn!(%key, "Failed to delete image: {e}"),
    }
}

/// Remove every row that hangs off the given recipes.
pub async fn delete_recipe_dependents<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<(), AppError> {
    use crate::entity::{favorite, shopping_cart};

    if recipe_ids.is_empty() {
        return Ok(());
    }
    let ids = || recipe_ids.iter().copied();
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.is_in(ids()))
        .exec(db)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.is_in(ids()))
        .exec(db)
        .await?;
    favorite::Entity::delete_many()
        .filter(favorite::Column::RecipeId.is_in(ids()))
        .exec(db)
        .await?;
    shopping_cart::Entity::delete_many()
        .filter(shopping_cart::Column::RecipeId.is_in(ids()))
        .exec(db)
        .await?;
    Ok(())
}

/// Build full recipe payloads for a page of recipes, preserving their order.
///
/// Tags, ingredients, authors and the caller's flags are each loaded with one
/// query for the whole page.
pub async fn recipe_responses<C: ConnectionTrait>(
    db: &C,
    media: &MediaConfig,
    actor: Option<i32>,
    recipes: Vec<recipe::Model>,
) -> Result<Vec<RecipeResponse>, AppError> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut tags_by_recipe = load_tags(db, &recipe_ids).await?;
    let mut ingredients_by_recipe = load_ingredients(db, &recipe_ids).await?;

    let authors: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let favorited = favorited_by(db, actor, &recipe_ids).await?;
    let in_cart = in_cart_of(db, actor, &recipe_ids).await?;
    let subscribed = subscribed_by(db, actor, &author_ids).await?;

    recipes
        .into_iter()
        .map(|r| {
            let author = authors.get(&r.author_id).cloned().ok_or_else(|| {
                AppError::Internal(format!("Author {} of recipe {} missing", r.author_id, r.id))
            })?;
            Ok(RecipeResponse {
                id: r.id,
                tags: tags_by_recipe.remove(&r.id).unwrap_or_default(),
                author: UserResponse::new(author, subscribed.contains(&r.author_id)),
                ingredients: ingredients_by_recipe.remove(&r.id).unwrap_or_default(),
                is_favorited: favorited.contains(&r.id),
                is_in_shopping_cart: in_cart.contains(&r.id),
                image: media.url_for(&r.image),
                name: r.name,
                text: r.text,
                cooking_time: r.cooking_time,
                created_at: r.created_at,
            })
        })
        .collect()
}

/// Single-recipe variant of [`recipe_responses`].
pub async fn recipe_response<C: ConnectionTrait>(
    db: &C,
    media: &MediaConfig,
    actor: Option<i32>,
    recipe: recipe::Model,
) -> Result<RecipeResponse, AppError> {
    recipe_responses(db, media, actor, vec![recipe])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Recipe response assembly returned nothing".into()))
}

async fn load_tags<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<HashMap<i32, Vec<TagResponse>>, AppError> {
    let links = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(HashMap::new());
    }
    let tags: HashMap<i32, tag::Model> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(links.iter().map(|l| l.tag_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut by_recipe: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    for link in links {
        if let Some(t) = tags.get(&link.tag_id) {
            by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(TagResponse::from(t.clone()));
        }
    }
    for list in by_recipe.values_mut() {
        list.sort_by_key(|t| t.id);
    }
    Ok(by_recipe)
}

async fn load_ingredients<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<HashMap<i32, Vec<IngredientAmountResponse>>, AppError> {
    let lines = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;
    let ingredients = ingredients_by_id(db, lines.iter().map(|l| l.ingredient_id)).await?;

    let mut by_recipe: HashMap<i32, Vec<IngredientAmountResponse>> = HashMap::new();
    for line in lines {
        if let Some(ing) = ingredients.get(&line.ingredient_id) {
            by_recipe
                .entry(line.recipe_id)
                .or_default()
                .push(IngredientAmountResponse {
                    id: ing.id,
                    name: ing.name.clone(),
                    measurement_unit: ing.measurement_unit.clone(),
                    amount: line.amount,
                });
        }
    }
    Ok(by_recipe)
}

/// Load ingredients keyed by ID.
pub async fn ingredients_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, ingredient::Model>, AppError> {
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect())
}
