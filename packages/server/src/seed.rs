//! Reference-data seeding and startup index maintenance.

use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use serde::Deserialize;
use tracing::info;

use crate::entity::{favorite, ingredient, recipe, recipe_tag, shopping_cart, subscription, tag};

/// One ingredient row to seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

/// One tag row to seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagSeed {
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Insert ingredients, skipping `(name, measurement_unit)` pairs that already
/// exist. Returns how many rows were new.
pub async fn seed_ingredients<C: ConnectionTrait>(
    db: &C,
    rows: &[IngredientSeed],
) -> Result<u64, DbErr> {
    let mut inserted = 0u64;
    for row in rows {
        let model = ingredient::ActiveModel {
            name: Set(row.name.clone()),
            measurement_unit: Set(row.measurement_unit.clone()),
            ..Default::default()
        };

        let result = ingredient::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => inserted += n,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new ingredients", inserted);
    }
    Ok(inserted)
}

/// Insert tags, skipping any whose name or slug is already taken. Returns how
/// many rows were new.
pub async fn seed_tags<C: ConnectionTrait>(db: &C, rows: &[TagSeed]) -> Result<u64, DbErr> {
    let mut inserted = 0u64;
    for row in rows {
        let model = tag::ActiveModel {
            name: Set(row.name.clone()),
            color: Set(row.color.clone()),
            slug: Set(row.slug.clone()),
            ..Default::default()
        };

        let result = tag::Entity::insert(model)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => inserted += n,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new tags", inserted);
    }
    Ok(inserted)
}

/// Ensure required database indexes exist.
///
/// Schema sync creates primary and unique keys only. These back the reverse
/// lookups done by filters, cascades and the newest-first ordering.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let statements = [
        (
            "idx_recipe_created",
            Index::create()
                .table(recipe::Entity)
                .col(recipe::Column::CreatedAt)
                .col(recipe::Column::Id)
                .to_owned(),
        ),
        (
            "idx_recipe_tag_tag",
            Index::create()
                .table(recipe_tag::Entity)
                .col(recipe_tag::Column::TagId)
                .to_owned(),
        ),
        (
            "idx_favorite_recipe",
            Index::create()
                .table(favorite::Entity)
                .col(favorite::Column::RecipeId)
                .to_owned(),
        ),
        (
            "idx_shopping_cart_recipe",
            Index::create()
                .table(shopping_cart::Entity)
                .col(shopping_cart::Column::RecipeId)
                .to_owned(),
        ),
        (
            "idx_subscription_author",
            Index::create()
                .table(subscription::Entity)
                .col(subscription::Column::AuthorId)
                .to_owned(),
        ),
    ];

    for (name, mut stmt) in statements {
        let sql = stmt
            .if_not_exists()
            .name(name)
            .to_string(PostgresQueryBuilder);
        match db.execute_unprepared(&sql).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
