use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::recipe::ShortRecipeResponse;
use super::shared::Pagination;
use crate::entity::user;

/// A followed author with a preview of their recipes.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    /// Newest first, truncated to `recipes_limit` when given.
    pub recipes: Vec<ShortRecipeResponse>,
    /// Total number of the author's recipes, regardless of `recipes_limit`.
    #[schema(example = 12)]
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    pub fn new(
        author: user::Model,
        is_subscribed: bool,
        recipes: Vec<ShortRecipeResponse>,
        recipes_count: u64,
    ) -> Self {
        Self {
            id: author.id,
            email: author.email,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed,
            recipes,
            recipes_count,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Maximum number of recipes embedded per author.
    pub recipes_limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionListResponse {
    pub data: Vec<SubscriptionResponse>,
    pub pagination: Pagination,
}

/// The recipes shown for one author, and how many they have in total.
#[derive(Debug)]
pub struct Preview<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for Preview<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Group `(author_id, item)` pairs by author, keeping at most `limit` items per
/// author in input order. Totals come from `totals`, which counts every recipe
/// of each author rather than only the fetched ones.
pub fn group_previews<T>(
    items: impl IntoIterator<Item = (i32, T)>,
    totals: &HashMap<i32, u64>,
    limit: Option<u64>,
) -> HashMap<i32, Preview<T>> {
    let mut grouped: HashMap<i32, Preview<T>> = totals
        .iter()
        .map(|(&author_id, &total)| (author_id, Preview { items: Vec::new(), total }))
        .collect();
    for (author_id, item) in items {
        let preview = grouped.entry(author_id).or_default();
        if limit.is_none_or(|l| (preview.items.len() as u64) < l) {
            preview.items.push(item);
        }
    }
    grouped
}
