use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn cannot_subscribe_to_yourself() {
    let app = TestApp::spawn().await;
    let me = app.create_user("me").await;

    let res = app.post(&routes::subscribe(me.id), &json!({}), Some(&me.token)).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn subscribing_twice_is_a_conflict() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("author").await;

    let first = app.post(&routes::subscribe(author.id), &json!({}), Some(&reader.token)).await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["is_subscribed"], true);
    assert_eq!(first.body["recipes_count"], 0);

    let second = app.post(&routes::subscribe(author.id), &json!({}), Some(&reader.token)).await;
    assert_eq!(second.status, 409);
}

#[tokio::test]
async fn subscribing_to_a_missing_user_is_not_found() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;

    let res = app.post(&routes::subscribe(9999), &json!({}), Some(&reader.token)).await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn unsubscribing_without_a_subscription_is_not_found() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("author").await;

    let res = app.delete(&routes::subscribe(author.id), Some(&reader.token)).await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn recipes_limit_truncates_the_preview_but_not_the_count() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("author").await;
    let salt = app.ingredient_id("Salt").await;
    app.create_recipe(&author.token, "One", &[(salt, 1)], &[]).await;
    app.create_recipe(&author.token, "Two", &[(salt, 1)], &[]).await;
    let newest = app.create_recipe(&author.token, "Three", &[(salt, 1)], &[]).await;
    app.post(&routes::subscribe(author.id), &json!({}), Some(&reader.token)).await;

    let res = app
        .get(
            &format!("{}?recipes_limit=1", routes::SUBSCRIPTIONS),
            Some(&reader.token),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data_ids(), vec![author.id]);
    let entry = &res.body["data"][0];
    assert_eq!(entry["recipes_count"], 3);
    assert_eq!(entry["recipes"].as_array().map(Vec::len), Some(1));
    assert_eq!(entry["recipes"][0]["id"], newest);

    let short = app.get(routes::SUBSCRIPTIONS_SHORT, Some(&reader.token)).await;
    assert_eq!(short.body["data"][0]["recipes"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn recipes_limit_applies_to_each_author_separately() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let prolific = app.create_user("prolific").await;
    let quiet = app.create_user("quiet").await;
    let idle = app.create_user("idle").await;
    let salt = app.ingredient_id("Salt").await;
    let mut prolific_ids = Vec::new();
    for name in ["A", "B", "C", "D"] {
        prolific_ids.push(app.create_recipe(&prolific.token, name, &[(salt, 1)], &[]).await);
    }
    let only = app.create_recipe(&quiet.token, "Solo", &[(salt, 1)], &[]).await;
    for author in [&prolific, &quiet, &idle] {
        app.post(&routes::subscribe(author.id), &json!({}), Some(&reader.token)).await;
    }

    let res = app
        .get(&format!("{}?recipes_limit=2", routes::SUBSCRIPTIONS), Some(&reader.token))
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data_ids(), vec![prolific.id, quiet.id, idle.id]);
    let preview_ids = |i: usize| -> Vec<i64> {
        res.body["data"][i]["recipes"]
            .as_array()
            .map(|rs| rs.iter().filter_map(|r| r["id"].as_i64()).collect())
            .unwrap_or_default()
    };
    assert_eq!(preview_ids(0), vec![prolific_ids[3] as i64, prolific_ids[2] as i64]);
    assert_eq!(res.body["data"][0]["recipes_count"], 4);
    assert_eq!(preview_ids(1), vec![only as i64]);
    assert_eq!(res.body["data"][1]["recipes_count"], 1);
    assert!(preview_ids(2).is_empty());
    assert_eq!(res.body["data"][2]["recipes_count"], 0);

    let counts_only = app
        .get(&format!("{}?recipes_limit=0", routes::SUBSCRIPTIONS), Some(&reader.token))
        .await;
    assert_eq!(counts_only.body["data"][0]["recipes"].as_array().map(Vec::len), Some(0));
    assert_eq!(counts_only.body["data"][0]["recipes_count"], 4);
}

#[tokio::test]
async fn unsubscribe_removes_the_author_from_the_list() {
    let app = TestApp::spawn().await;
    let reader = app.create_user("reader").await;
    let author = app.create_user("author").await;
    app.post(&routes::subscribe(author.id), &json!({}), Some(&reader.token)).await;

    let res = app.delete(&routes::subscribe(author.id), Some(&reader.token)).await;
    assert_eq!(res.status, 204);

    let list = app.get(routes::SUBSCRIPTIONS, Some(&reader.token)).await;
    assert!(list.data_ids().is_empty());
}
