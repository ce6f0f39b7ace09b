use serde_json::json;

use crate::common::{TestApp, routes};

mod signup {
    use super::*;

    #[tokio::test]
    async fn new_user_can_sign_up_with_valid_details() {
        let app = TestApp::spawn().await;

        let res = app.signup("julia").await;

        assert_eq!(res.status, 201);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "julia");
        assert_eq!(res.body["email"], "julia@example.com");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_taken_email() {
        let app = TestApp::spawn().await;
        app.create_user("julia").await;

        let res = app
            .post(
                routes::SIGNUP,
                &json!({
                    "email": "JULIA@example.com",
                    "username": "someone_else",
                    "first_name": "J",
                    "last_name": "C",
                    "password": "securepass",
                }),
                None,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_taken_username() {
        let app = TestApp::spawn().await;
        app.create_user("julia").await;

        let res = app
            .post(
                routes::SIGNUP,
                &json!({
                    "email": "other@example.com",
                    "username": "julia",
                    "first_name": "J",
                    "last_name": "C",
                    "password": "securepass",
                }),
                None,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_short_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::SIGNUP,
                &json!({
                    "email": "julia@example.com",
                    "username": "julia",
                    "first_name": "Julia",
                    "last_name": "Child",
                    "password": "short",
                }),
                None,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn cannot_sign_up_with_a_malformed_email() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::SIGNUP,
                &json!({
                    "email": "not-an-email",
                    "username": "julia",
                    "first_name": "Julia",
                    "last_name": "Child",
                    "password": "securepass",
                }),
                None,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_receives_a_token() {
        let app = TestApp::spawn().await;
        app.signup("julia").await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "julia@example.com", "password": "securepass"}),
                None,
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["auth_token"].is_string());
    }

    #[tokio::test]
    async fn cannot_login_with_wrong_password() {
        let app = TestApp::spawn().await;
        app.signup("julia").await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "julia@example.com", "password": "wrongpass"}),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn cannot_login_with_unknown_email() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": "securepass"}),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn protected_route_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::ME, None).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_even_on_public_routes() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::RECIPES, Some("not-a-jwt")).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod set_password {
    use super::*;

    #[tokio::test]
    async fn new_password_replaces_the_old_one() {
        let app = TestApp::spawn().await;
        let user = app.create_user("julia").await;

        let res = app
            .post(
                routes::SET_PASSWORD,
                &json!({"current_password": "securepass", "new_password": "evenbetterpass"}),
                Some(&user.token),
            )
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let old = app
            .post(
                routes::LOGIN,
                &json!({"email": "julia@example.com", "password": "securepass"}),
                None,
            )
            .await;
        assert_eq!(old.status, 401);

        let new = app
            .post(
                routes::LOGIN,
                &json!({"email": "julia@example.com", "password": "evenbetterpass"}),
                None,
            )
            .await;
        assert_eq!(new.status, 200);
    }

    #[tokio::test]
    async fn wrong_current_password_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let user = app.create_user("julia").await;

        let res = app
            .post(
                routes::SET_PASSWORD,
                &json!({"current_password": "wrongpass", "new_password": "evenbetterpass"}),
                Some(&user.token),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn malformed_json_body_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::LOGIN))
            .header("Content-Type", "application/json")
            .body("{not json")
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().await.expect("JSON error body");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
