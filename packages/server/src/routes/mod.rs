use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

/// JSON API, mounted under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(user_routes())
        .merge(reference_routes())
        .merge(recipe_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::signup, handlers::user::list_users))
        .routes(routes!(handlers::user::me, handlers::user::delete_me))
        .routes(routes!(handlers::auth::set_password))
        .routes(routes!(handlers::subscription::list_subscriptions))
        .routes(routes!(handlers::subscription::list_subscriptions_short))
        .routes(routes!(handlers::user::get_user))
        .routes(routes!(
            handlers::subscription::subscribe,
            handlers::subscription::unsubscribe
        ))
}

fn reference_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::tag::list_tags))
        .routes(routes!(handlers::tag::get_tag))
        .routes(routes!(handlers::ingredient::list_ingredients))
        .routes(routes!(handlers::ingredient::get_ingredient))
}

fn recipe_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::recipe::list_recipes,
            handlers::recipe::create_recipe
        ))
        .routes(routes!(handlers::shopping_cart::download_shopping_cart))
        .routes(routes!(
            handlers::recipe::get_recipe,
            handlers::recipe::update_recipe,
            handlers::recipe::patch_recipe,
            handlers::recipe::delete_recipe
        ))
        .routes(routes!(
            handlers::favorite::add_favorite,
            handlers::favorite::remove_favorite
        ))
        .routes(routes!(
            handlers::shopping_cart::add_to_cart,
            handlers::shopping_cart::remove_from_cart
        ))
        .routes(routes!(handlers::favorite::list_favourites))
}

/// Stored images, served outside `/api`.
pub fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::media::serve_media))
}
