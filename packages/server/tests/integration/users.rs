use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn me_returns_the_callers_profile() {
    let app = TestApp::spawn().await;
    let user = app.create_user("julia").await;

    let res = app.get(routes::ME, Some(&user.token)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["id"], user.id);
    assert_eq!(res.body["username"], "julia");
    assert_eq!(res.body["is_subscribed"], false);
}

#[tokio::test]
async fn user_list_is_paginated_by_id() {
    let app = TestApp::spawn().await;
    let a = app.create_user("alice").await;
    let b = app.create_user("bob").await;
    app.create_user("carol").await;

    let res = app.get(&format!("{}?limit=2", routes::USERS), None).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data_ids(), vec![a.id, b.id]);
    assert_eq!(res.body["pagination"]["total"], 3);
    assert_eq!(res.body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn profile_shows_subscription_state_for_the_caller() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("author").await;

    let before = app.get(&routes::user(author.id), Some(&reader.token)).await;
    assert_eq!(before.body["is_subscribed"], false);

    let sub = app
        .post(&routes::subscribe(author.id), &serde_json::json!({}), Some(&reader.token))
        .await;
    assert_eq!(sub.status, 201, "{}", sub.text);

    let after = app.get(&routes::user(author.id), Some(&reader.token)).await;
    assert_eq!(after.body["is_subscribed"], true);

    let anonymous = app.get(&routes::user(author.id), None).await;
    assert_eq!(anonymous.status, 200);
    assert_eq!(anonymous.body["is_subscribed"], false);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::user(9999), None).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn deleting_the_account_removes_everything_it_owns() {
    let app = TestApp::spawn().await;
    let leaving = app.create_user("leaving").await;
    let fan = app.create_user("fan").await;
    let salt = app.ingredient_id("Salt").await;
    let own = app.create_recipe(&leaving.token, "Stew", &[(salt, 5)], &[]).await;
    let kept = app.create_recipe(&fan.token, "Soup", &[(salt, 2)], &[]).await;

    for (path, token) in [
        (routes::favorite(own), &fan.token),
        (routes::shopping_cart(own), &fan.token),
        (routes::subscribe(leaving.id), &fan.token),
        (routes::favorite(kept), &leaving.token),
        (routes::subscribe(fan.id), &leaving.token),
    ] {
        let res = app.post(&path, &json!({}), Some(token)).await;
        assert_eq!(res.status, 201, "{path}: {}", res.text);
    }
    assert_eq!(app.media_files().len(), 1);

    let res = app
        .delete_with_body(routes::ME, &json!({ "current_password": "securepass" }), &leaving.token)
        .await;
    assert_eq!(res.status, 204, "{}", res.text);

    assert_eq!(app.get(&routes::user(leaving.id), None).await.status, 404);
    assert_eq!(app.get(&routes::recipe(own), None).await.status, 404);
    assert_eq!(app.get(&routes::recipe(kept), None).await.status, 200);

    let favourites = app.get(routes::FAVOURITES, Some(&fan.token)).await;
    assert_eq!(favourites.body["pagination"]["total"], 0);
    let subscriptions = app.get(routes::SUBSCRIPTIONS, Some(&fan.token)).await;
    assert_eq!(subscriptions.body["pagination"]["total"], 0);
    let cart = app.get(routes::DOWNLOAD_CART, Some(&fan.token)).await;
    assert_eq!(cart.text, "Shopping list:\n");
    let fan_profile = app.get(&routes::user(fan.id), None).await;
    assert_eq!(fan_profile.status, 200);

    // Both recipes share the fixture image, so it stays while the fan's recipe exists.
    assert_eq!(app.media_files().len(), 1);

    let login = app
        .post(
            routes::LOGIN,
            &json!({ "email": "leaving@example.com", "password": "securepass" }),
            None,
        )
        .await;
    assert_eq!(login.status, 401);
    let me = app.get(routes::ME, Some(&leaving.token)).await;
    assert_eq!(me.status, 401);
    assert_eq!(me.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn deleting_the_last_recipe_owner_releases_the_image() {
    let app = TestApp::spawn().await;
    let cook = app.create_user("cook").await;
    let salt = app.ingredient_id("Salt").await;
    app.create_recipe(&cook.token, "Stew", &[(salt, 5)], &[]).await;
    assert_eq!(app.media_files().len(), 1);

    let res = app
        .delete_with_body(routes::ME, &json!({ "current_password": "securepass" }), &cook.token)
        .await;

    assert_eq!(res.status, 204, "{}", res.text);
    assert!(app.media_files().is_empty());
}

#[tokio::test]
async fn account_deletion_requires_the_current_password() {
    let app = TestApp::spawn().await;
    let user = app.create_user("julia").await;

    let res = app
        .delete_with_body(routes::ME, &json!({ "current_password": "wrong-password" }), &user.token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(app.get(routes::ME, Some(&user.token)).await.status, 200);
}
