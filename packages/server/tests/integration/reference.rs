use crate::common::{TestApp, routes};

fn names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|v| v["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

mod tags {
    use super::*;

    #[tokio::test]
    async fn all_tags_are_listed_by_name() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::TAGS, None).await;

        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body), vec!["Breakfast", "Dinner", "Lunch"]);
    }

    #[tokio::test]
    async fn single_tag_carries_color_and_slug() {
        let app = TestApp::spawn().await;
        let id = app.tag_id("lunch").await;

        let res = app.get(&routes::tag(id), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["color"], "#49B64E");
        assert_eq!(res.body["slug"], "lunch");
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::tag(9999), None).await;

        assert_eq!(res.status, 404);
    }
}

mod ingredients {
    use super::*;

    #[tokio::test]
    async fn name_filter_is_a_case_insensitive_prefix() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}?name=sa", routes::INGREDIENTS), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body), vec!["Salmon", "Salt"]);
    }

    #[tokio::test]
    async fn wildcards_in_the_name_filter_are_literal() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}?name=%25", routes::INGREDIENTS), None).await;

        assert_eq!(res.status, 200);
        assert!(names(&res.body).is_empty());
    }

    #[tokio::test]
    async fn measurement_unit_filter_matches_exactly() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?measurement_unit=ml", routes::INGREDIENTS), None)
            .await;

        assert_eq!(names(&res.body), vec!["Milk"]);
    }

    #[tokio::test]
    async fn single_ingredient_is_returned_by_id() {
        let app = TestApp::spawn().await;
        let id = app.ingredient_id("Egg").await;

        let res = app.get(&routes::ingredient(id), None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["measurement_unit"], "pcs");
    }
}
