mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tower_cookies::cookie::SameSite;

use crate::common::{insert_user_with_role, setup_server, setup_test_db, signup};

#[tokio::test]
async fn route_signup_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;

    let resp = server
        .post("/api/v1/account/signup")
        .json(&json!({ "username": "foobar", "password": "foobaz" }))
        .await;
    resp.assert_status(StatusCode::OK);

    let cookie = resp.cookie(edura::web::middlewares::AUTH_TOKEN);
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));

    let body = resp.json::<Value>();
    assert_eq!(body["username"], "foobar");
    assert_eq!(body["role"], "student");

    // try to signup twice
    let resp = server
        .post("/api/v1/account/signup")
        .json(&json!({ "username": "foobar", "password": "foobaz" }))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn route_signin_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    signup(&server, "SIGNINTEST", "SIGNINTEST").await;
    server.clear_cookies();

    let resp = server
        .post("/api/v1/account/signin")
        .json(&json!({ "username": "SIGNINTEST", "password": "SIGNINTEST" }))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.json::<Value>()["username"], "SIGNINTEST");

    // wrong credentials
    server.clear_cookies();
    let resp = server
        .post("/api/v1/account/signin")
        .json(&json!({ "username": "SIGNINTEST", "password": "WRONGPASSWORD" }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert!(resp.text().contains("Authentication error"));

    // non-existing account
    let resp = server
        .post("/api/v1/account/signin")
        .json(&json!({ "username": "nonexisting", "password": "nvm" }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn route_user_list_requires_admin() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    signup(&server, "FOOBAR", "FOOBAZ").await;

    // students are not allowed in
    let resp = server
        .get("/api/v1/account/page")
        .add_query_param("limit", "5")
        .add_query_param("offset", "0")
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // switch to an admin account
    insert_user_with_role(&db, "admin", "admin", "admin").await;
    server.clear_cookies();
    crate::common::signin(&server, "admin", "admin").await;

    let resp = server
        .get("/api/v1/account/page")
        .add_query_param("limit", "5")
        .add_query_param("offset", "0")
        .await;
    resp.assert_status(StatusCode::OK);

    let body = resp.json::<Value>();
    assert!(body["total"].as_i64().unwrap() >= 2);
    assert!(body["items"].is_array());
}

#[tokio::test]
async fn route_user_update_is_owner_scoped() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let first = signup(&server, "FIRST", "FIRST").await;
    server.clear_cookies();
    let second = signup(&server, "SECOND", "SECOND").await;

    // SECOND may not rename FIRST
    let resp = server
        .put(&format!("/api/v1/account/{}", first["id"].as_str().unwrap()))
        .json(&json!({ "username": "STOLEN", "password": "" }))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // but may rename themselves
    let resp = server
        .put(&format!("/api/v1/account/{}", second["id"].as_str().unwrap()))
        .json(&json!({ "username": "RENAMED", "password": "" }))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.json::<Value>()["username"], "RENAMED");
}
