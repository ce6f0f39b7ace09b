use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn shared_ingredients_are_summed_across_recipes() {
    let app = TestApp::spawn().await;
    let cook = app.create_user("cook").await;
    let salt = app.ingredient_id("Salt").await;
    let milk = app.ingredient_id("Milk").await;
    let a = app
        .create_recipe(&cook.token, "Brine", &[(salt, 5)], &[])
        .await;
    let b = app
        .create_recipe(&cook.token, "Porridge", &[(milk, 200), (salt, 3)], &[])
        .await;

    for id in [a, b] {
        let res = app.post(&routes::shopping_cart(id), &json!({}), Some(&cook.token)).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app.get(routes::DOWNLOAD_CART, Some(&cook.token)).await;

    assert_eq!(res.status, 200);
    assert!(
        res.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/plain"))
    );
    assert_eq!(res.text, "Shopping list:\nMilk - 200, ml\nSalt - 8, g\n");
}

#[tokio::test]
async fn empty_cart_downloads_only_the_header() {
    let app = TestApp::spawn().await;
    let cook = app.create_user("cook").await;

    let res = app.get(routes::DOWNLOAD_CART, Some(&cook.token)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.text, "Shopping list:\n");
}

#[tokio::test]
async fn download_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::DOWNLOAD_CART, None).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn carts_are_per_user() {
    let app = TestApp::spawn().await;
    let cook = app.create_user("cook").await;
    let guest = app.create_user("guest").await;
    let salt = app.ingredient_id("Salt").await;
    let id = app.create_recipe(&cook.token, "Brine", &[(salt, 5)], &[]).await;
    app.post(&routes::shopping_cart(id), &json!({}), Some(&cook.token)).await;

    let res = app.get(routes::DOWNLOAD_CART, Some(&guest.token)).await;

    assert_eq!(res.text, "Shopping list:\n");
}
