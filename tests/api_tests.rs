mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ADMIN_EMAIL, ScriptedCep, admin_token, login, request, signup, spawn_app};

#[tokio::test]
async fn test_requires_authentication() {
    let app = spawn_app(ScriptedCep::new()).await;

    let (status, body) = request(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["result"], "error");

    let (status, _) = request(&app, "GET", "/api/users", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A token signed with a different key must be rejected too.
    let forged = cadastro::auth::TokenService::new("wrong-key", 24)
        .issue(1, ADMIN_EMAIL, &cadastro::auth::RoleSet::user_only())
        .unwrap();
    let (status, _) = request(&app, "GET", "/api/users/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_current_user() {
    let app = spawn_app(ScriptedCep::new()).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": ADMIN_EMAIL, "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["result"], "error");

    let token = admin_token(&app).await;

    let (status, body) = request(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "success");
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(
        body["data"]["roles"]
            .as_array()
            .unwrap()
            .contains(&json!("ROLE_ADMIN"))
    );
}

#[tokio::test]
async fn test_signup_then_login() {
    let app = spawn_app(ScriptedCep::new()).await;

    let id = signup(&app, "Ana Souza", "ana@example.com", "secret1").await;
    assert!(id > 0);

    // Same email twice: the second registration must fail and leave a
    // single row behind.
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"name": "Other", "email": "ana@example.com", "password": "secret2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");

    let token = login(&app, "ana@example.com", "secret1").await;
    let (status, body) = request(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["ROLE_USER"]));

    let admin = admin_token(&app).await;
    let (_, body) = request(
        &app,
        "GET",
        "/api/users?search=ana@example.com",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(body["data"]["totalElements"], 1);
}

#[tokio::test]
async fn test_signup_validation_reports_first_field() {
    let app = spawn_app(ScriptedCep::new()).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"name": "", "email": "", "password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name is required");

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"name": "Ana", "email": "ana@example.com", "password": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must have at least 6 characters");
}

#[tokio::test]
async fn test_signup_role_tags() {
    let app = spawn_app(ScriptedCep::new()).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "secret1",
            "roles": ["admin"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["roles"], json!(["ROLE_ADMIN"]));

    let token = login(&app, "root@example.com", "secret1").await;
    let (status, _) = request(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ownership_rules() {
    let app = spawn_app(ScriptedCep::new()).await;

    let id_a = signup(&app, "User A", "a@example.com", "secret1").await;
    let id_b = signup(&app, "User B", "b@example.com", "secret1").await;

    let token_a = login(&app, "a@example.com", "secret1").await;
    let admin = admin_token(&app).await;

    // Self access is allowed, someone else's record is not.
    let (status, _) = request(&app, "GET", &format!("/api/users/{id_a}"), Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request(&app, "GET", &format!("/api/users/{id_b}"), Some(&token_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["result"], "error");

    // Admin supersedes ownership.
    let (status, _) = request(&app, "GET", &format!("/api/users/{id_a}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    // Listing users is admin-only.
    let (status, _) = request(&app, "GET", "/api/users", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Deletion is admin-only, even for the caller's own record.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/users/{id_a}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/users/{id_b}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&app, "GET", &format!("/api/users/{id_b}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_profile_email_conflict() {
    let app = spawn_app(ScriptedCep::new()).await;

    let id_a = signup(&app, "User A", "a@example.com", "secret1").await;
    signup(&app, "User B", "b@example.com", "secret1").await;

    let token_a = login(&app, "a@example.com", "secret1").await;

    // Another user's email is a conflict.
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/users/{id_a}"),
        Some(&token_a),
        Some(json!({"name": "User A", "email": "b@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");

    // Keeping the caller's own email is fine.
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/users/{id_a}"),
        Some(&token_a),
        Some(json!({"name": "Renamed A", "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed A");
}

#[tokio::test]
async fn test_password_update() {
    let app = spawn_app(ScriptedCep::new()).await;

    let id = signup(&app, "Ana", "ana@example.com", "secret1").await;
    let token = login(&app, "ana@example.com", "secret1").await;

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/users/{id}/password"),
        Some(&token),
        Some(json!({"password": "new-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The old password no longer works, the new one does.
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&app, "ana@example.com", "new-secret").await;
}

#[tokio::test]
async fn test_listing_pagination_with_bogus_sort_key() {
    let app = spawn_app(ScriptedCep::new()).await;

    signup(&app, "User One", "one@example.com", "secret1").await;
    signup(&app, "User Two", "two@example.com", "secret1").await;
    signup(&app, "User Three", "three@example.com", "secret1").await;

    let admin = admin_token(&app).await;

    // Admin + three signups = 4 users; an unknown sortBy silently falls
    // back to the default ordering instead of erroring.
    let (status, body) = request(
        &app,
        "GET",
        "/api/users?page=0&size=2&sortBy=bogus",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["totalElements"], 4);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["first"], true);
    assert_eq!(body["data"]["last"], false);

    let (status, body) = request(
        &app,
        "GET",
        "/api/users?page=1&size=2&sortBy=bogus",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["first"], false);
    assert_eq!(body["data"]["last"], true);
}

#[tokio::test]
async fn test_listing_sorted_by_name_desc() {
    let app = spawn_app(ScriptedCep::new()).await;

    signup(&app, "Bruna", "bruna@example.com", "secret1").await;
    signup(&app, "Carla", "carla@example.com", "secret1").await;

    let admin = admin_token(&app).await;

    let (status, body) = request(
        &app,
        "GET",
        "/api/users?sortBy=name&direction=desc",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carla", "Bruna", "Admin User"]);
}

#[tokio::test]
async fn test_user_search_matches_name_and_email() {
    let app = spawn_app(ScriptedCep::new()).await;

    signup(&app, "Ana Souza", "ana@example.com", "secret1").await;
    signup(&app, "Bruno Lima", "bruno@other.org", "secret1").await;

    let admin = admin_token(&app).await;

    // Case-insensitive substring over the name.
    let (_, body) = request(&app, "GET", "/api/users?search=souza", Some(&admin), None).await;
    assert_eq!(body["data"]["totalElements"], 1);
    assert_eq!(body["data"]["content"][0]["email"], "ana@example.com");

    // And over the email domain.
    let (_, body) = request(&app, "GET", "/api/users?search=other.org", Some(&admin), None).await;
    assert_eq!(body["data"]["totalElements"], 1);
    assert_eq!(body["data"]["content"][0]["name"], "Bruno Lima");
}
