//! HTTP flow tests for the account router
//! Driven through `tower::ServiceExt::oneshot` against the in-memory repository

#[cfg(test)]
mod support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::config::AccountConfig;
    use crate::infra::memory::InMemoryAccountRepository;
    use crate::presentation::router::account_router_generic;

    pub const EMAIL: &str = "test@gmail.com";
    pub const PASSWORD: &str = "testpassword123";

    pub fn app() -> (Router, InMemoryAccountRepository) {
        let repo = InMemoryAccountRepository::new();
        let router = account_router_generic(repo.clone(), AccountConfig::default());
        (router, repo)
    }

    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn create_user(app: &Router, email: &str, password: &str, name: &str) -> StatusCode {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        send(app, Method::POST, "/users/create", None, Some(body))
            .await
            .0
    }

    pub async fn obtain_token(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({ "email": email, "password": password });
        send(app, Method::POST, "/users/token", None, Some(body)).await
    }

    pub async fn token_for(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = obtain_token(app, email, password).await;
        assert_eq!(status, StatusCode::OK, "token request failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod create_user_tests {
    use super::support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_password::RawPassword};

    #[tokio::test]
    async fn test_create_valid_user() {
        let (app, repo) = app();
        let body = json!({ "email": EMAIL, "password": PASSWORD, "name": "test name" });

        let (status, res) = send(&app, Method::POST, "/users/create", None, Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["email"], EMAIL);
        assert_eq!(res["name"], "test name");
        assert!(res.get("password").is_none());

        let user = repo
            .find_by_email(&Email::new(EMAIL).unwrap())
            .await
            .unwrap()
            .unwrap();
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        assert!(user.password.verify(&raw, None));
    }

    #[tokio::test]
    async fn test_create_without_name() {
        let (app, _) = app();
        let body = json!({ "email": EMAIL, "password": PASSWORD });

        let (status, res) = send(&app, Method::POST, "/users/create", None, Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["name"], "");
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let (app, repo) = app();
        assert_eq!(create_user(&app, EMAIL, PASSWORD, "").await, StatusCode::CREATED);

        let body = json!({ "email": EMAIL, "password": PASSWORD, "name": "" });
        let (status, res) = send(&app, Method::POST, "/users/create", None, Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res["errors"]["email"].is_array());
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_short_password() {
        let (app, repo) = app();
        let body = json!({ "email": EMAIL, "password": "tpw", "name": "" });

        let (status, res) = send(&app, Method::POST, "/users/create", None, Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res["errors"]["password"].is_array());
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_missing_fields_reported_together() {
        let (app, repo) = app();

        let (status, res) = send(&app, Method::POST, "/users/create", None, Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["errors"]["email"][0], "This field is required.");
        assert_eq!(res["errors"]["password"][0], "This field is required.");
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/users/create",
            None,
            Some(json!("not an object")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod token_tests {
    use super::support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_token_for_valid_credentials() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let (status, res) = obtain_token(&app, EMAIL, PASSWORD).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!res["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_email_is_case_insensitive() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let (status, _) = obtain_token(&app, "Test@Gmail.com", PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_wrong_password() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let (status, res) = obtain_token(&app, EMAIL, "wrong").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.get("token").is_none());
        assert!(res["errors"]["non_field_errors"].is_array());
    }

    #[tokio::test]
    async fn test_token_unknown_user() {
        let (app, _) = app();

        let (status, res) = obtain_token(&app, EMAIL, PASSWORD).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.get("token").is_none());
    }

    #[tokio::test]
    async fn test_token_missing_or_blank_fields() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let (status, res) = obtain_token(&app, "", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.get("token").is_none());
        assert_eq!(res["errors"]["email"][0], "This field may not be blank.");
        assert_eq!(res["errors"]["password"][0], "This field may not be blank.");

        let (status, res) = send(
            &app,
            Method::POST,
            "/users/token",
            None,
            Some(json!({ "email": EMAIL })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["errors"]["password"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_token_blank_password_with_malformed_email() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let (status, res) = obtain_token(&app, "nope", "").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.get("token").is_none());
        assert_eq!(res["errors"]["password"][0], "This field may not be blank.");
        assert!(res["errors"].get("email").is_none());
    }

    #[tokio::test]
    async fn test_second_token_invalidates_first() {
        let (app, repo) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;

        let first = token_for(&app, EMAIL, PASSWORD).await;
        let second = token_for(&app, EMAIL, PASSWORD).await;
        assert_ne!(first, second);

        let (status, _) = send(&app, Method::GET, "/users/update", Some(&first), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/users/update", Some(&second), None).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(repo.token_count().await, 1);
    }
}

#[cfg(test)]
mod profile_tests {
    use super::support::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_password::RawPassword};

    #[tokio::test]
    async fn test_retrieve_requires_auth() {
        let (app, _) = app();

        let (status, _) = send(&app, Method::GET, "/users/update", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/users/update", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unauthorized_has_challenge_header() {
        let (app, _) = app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/users/update")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_retrieve_profile() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "test name").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let (status, res) = send(&app, Method::GET, "/users/update", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(res, json!({ "email": EMAIL, "name": "test name" }));
    }

    #[tokio::test]
    async fn test_token_scheme_accepted() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let request = Request::builder()
            .method(Method::GET)
            .uri("/users/update")
            .header(header::AUTHORIZATION, format!("Token {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let res: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(res["email"], EMAIL);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (app, repo) = app();
        create_user(&app, EMAIL, PASSWORD, "test name").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let body = json!({ "name": "updated name", "password": "updatedpassword" });
        let (status, res) =
            send(&app, Method::PATCH, "/users/update", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["name"], "updated name");

        let user = repo
            .find_by_email(&Email::new(EMAIL).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name.as_str(), "updated name");
        let raw = RawPassword::new("updatedpassword".to_string()).unwrap();
        assert!(user.password.verify(&raw, None));

        // the new password works for the token endpoint, the old one does not
        let (status, _) = obtain_token(&app, EMAIL, "updatedpassword").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = obtain_token(&app, EMAIL, PASSWORD).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_invalid_password() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let body = json!({ "password": "tpw" });
        let (status, res) =
            send(&app, Method::PATCH, "/users/update", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res["errors"]["password"].is_array());
    }

    #[tokio::test]
    async fn test_update_requires_auth() {
        let (app, _) = app();
        let body = json!({ "name": "updated name" });

        let (status, _) = send(&app, Method::PATCH, "/users/update", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;
        let body = json!({ "name": "updated name" });

        let (status, _) =
            send(&app, Method::POST, "/users/update", Some(&token), Some(body.clone())).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(&app, Method::POST, "/users/update", None, Some(body)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[cfg(test)]
mod admin_tests {
    use super::support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    use crate::application::{config::AccountConfig, user_store::UserStore};

    async fn create_staff(repo: &crate::InMemoryAccountRepository) {
        UserStore::new(Arc::new(repo.clone()), Arc::new(AccountConfig::default()))
            .create_superuser("admin@example.com", "password123".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_listing_contains_users() {
        let (app, repo) = app();
        create_staff(&repo).await;
        create_user(&app, EMAIL, PASSWORD, "test name").await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let (status, res) = send(&app, Method::GET, "/admin/users", Some(&token), None).await;

        assert_eq!(status, StatusCode::OK);
        let users = res.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["email"], "admin@example.com");
        assert_eq!(users[1]["email"], EMAIL);
        assert_eq!(users[1]["name"], "test name");
        assert_eq!(users[1]["is_staff"], false);
        assert!(users[0]["last_login_at"].is_number());
    }

    #[tokio::test]
    async fn test_get_single_user() {
        let (app, repo) = app();
        create_staff(&repo).await;
        create_user(&app, EMAIL, PASSWORD, "test name").await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let (_, list) = send(&app, Method::GET, "/admin/users", Some(&token), None).await;
        let id = list[1]["id"].as_str().unwrap().to_string();

        let (status, res) =
            send(&app, Method::GET, &format!("/admin/users/{id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["email"], EMAIL);

        let (status, _) = send(
            &app,
            Method::GET,
            "/admin/users/00000000-0000-4000-8000-000000000000",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::GET, "/admin/users/not-a-uuid", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_staff_forbidden() {
        let (app, _) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let (status, _) = send(&app, Method::GET, "/admin/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_requires_auth() {
        let (app, _) = app();
        let (status, _) = send(&app, Method::GET, "/admin/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body = json!({ "email": EMAIL, "password": PASSWORD });
        let (status, _) = send(&app, Method::POST, "/admin/users", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_staff_adds_user() {
        let (app, repo) = app();
        create_staff(&repo).await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let body = json!({
            "email": "Staff@Example.com",
            "password": PASSWORD,
            "name": "staff member",
            "is_staff": true,
        });
        let (status, res) = send(&app, Method::POST, "/admin/users", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["email"], "staff@example.com");
        assert_eq!(res["name"], "staff member");
        assert_eq!(res["is_active"], true);
        assert_eq!(res["is_staff"], true);
        assert_eq!(res["is_superuser"], false);
        assert!(res.get("password").is_none());
        assert_eq!(repo.user_count().await, 2);

        // the new staff member can use the admin listing
        let staff_token = token_for(&app, "staff@example.com", PASSWORD).await;
        let (status, _) = send(&app, Method::GET, "/admin/users", Some(&staff_token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_added_user_defaults_to_regular_account() {
        let (app, repo) = app();
        create_staff(&repo).await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let body = json!({ "email": EMAIL, "password": PASSWORD });
        let (status, res) = send(&app, Method::POST, "/admin/users", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["name"], "");
        assert_eq!(res["is_active"], true);
        assert_eq!(res["is_staff"], false);

        let user_token = token_for(&app, EMAIL, PASSWORD).await;
        let (status, _) = send(&app, Method::GET, "/admin/users", Some(&user_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_added_inactive_user_cannot_log_in() {
        let (app, repo) = app();
        create_staff(&repo).await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let body = json!({ "email": EMAIL, "password": PASSWORD, "is_active": false });
        let (status, res) = send(&app, Method::POST, "/admin/users", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["is_active"], false);

        let (status, _) = obtain_token(&app, EMAIL, PASSWORD).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_user_validation_errors() {
        let (app, repo) = app();
        create_staff(&repo).await;
        let token = token_for(&app, "admin@example.com", "password123").await;

        let body = json!({ "email": "admin@example.com", "password": "tpw" });
        let (status, res) = send(&app, Method::POST, "/admin/users", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res["errors"]["email"].is_array());
        assert!(res["errors"]["password"].is_array());
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_non_staff_cannot_add_user() {
        let (app, repo) = app();
        create_user(&app, EMAIL, PASSWORD, "").await;
        let token = token_for(&app, EMAIL, PASSWORD).await;

        let body = json!({ "email": "other@example.com", "password": PASSWORD, "is_staff": true });
        let (status, _) = send(&app, Method::POST, "/admin/users", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_only_superuser_adds_superuser() {
        let (app, repo) = app();
        create_staff(&repo).await;
        let admin_token = token_for(&app, "admin@example.com", "password123").await;

        let body = json!({ "email": "staff@example.com", "password": PASSWORD, "is_staff": true });
        let (status, _) =
            send(&app, Method::POST, "/admin/users", Some(&admin_token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let staff_token = token_for(&app, "staff@example.com", PASSWORD).await;

        let body = json!({
            "email": "root@example.com",
            "password": PASSWORD,
            "is_staff": true,
            "is_superuser": true,
        });
        let (status, _) = send(
            &app,
            Method::POST,
            "/admin/users",
            Some(&staff_token),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(repo.user_count().await, 2);

        let (status, res) =
            send(&app, Method::POST, "/admin/users", Some(&admin_token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res["is_superuser"], true);
    }
}
