//! API integration tests against a running server
//!
//! Expects the admin account from `.env.example` (admin / admin).

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// 1x1 transparent PNG
const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Helper to get an access token for the admin account
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send token request");

    let body: Value = response.json().await.expect("Failed to parse token response");
    body["access"].as_str().expect("No access token in response").to_string()
}

/// Suffix keeping names unique across runs
fn unique() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn create_author(client: &Client, token: &str, last_name: &str) -> Value {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "last_name": last_name, "first_name": "Test" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn create_book(client: &Client, token: &str, author_id: i64, title: &str, year: i32) -> reqwest::Response {
    client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "title": title, "year": year, "author_id": author_id }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_ready_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_token_pair_and_refresh() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({ "username": "admin", "password": "admin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let pair: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .post(format!("{}/token/refresh", BASE_URL))
        .json(&json!({ "refresh": pair["refresh"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());

    // An access token is not a refresh token
    let response = client
        .post(format!("{}/token/refresh", BASE_URL))
        .json(&json!({ "refresh": pair["access"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/token", BASE_URL))
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_title_unique_per_author() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique();

    let first = create_author(&client, &token, &format!("First{}", tag)).await;
    let second = create_author(&client, &token, &format!("Second{}", tag)).await;
    let first_id = first["id"].as_i64().expect("No author ID");
    let second_id = second["id"].as_i64().expect("No author ID");

    let title = format!("Shared Title {}", tag);
    let response = create_book(&client, &token, first_id, &title, 1900).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_book(&client, &token, first_id, &title, 1901).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Same title under another author is fine
    let response = create_book(&client, &token, second_id, &title, 1900).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore]
async fn test_unknown_author_is_a_field_error() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = create_book(&client, &token, i32::MAX as i64, "Orphan", 1900).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["author_id"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_author_with_books_is_protected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique();

    let author = create_author(&client, &token, &format!("Protected{}", tag)).await;
    let author_id = author["id"].as_i64().expect("No author ID");
    let response = create_book(&client, &token, author_id, "Kept", 1950).await;
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Still there, with its book
    let response = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["books_count"], 1);
    assert_eq!(body["books"][0]["title"], "Kept");

    // Removing the book releases the author
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_filter_search_and_ordering() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique();

    let author = create_author(&client, &token, &format!("Ordered{}", tag)).await;
    let author_id = author["id"].as_i64().expect("No author ID");
    for (title, year) in [("Alpha", 1900), ("Beta", 2000), ("Gamma", 1950)] {
        let response = create_book(&client, &token, author_id, &format!("{} {}", title, tag), year).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client
        .get(format!("{}/books?author={}&ordering=-year", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 3);
    let years: Vec<i64> = body["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|b| b["year"].as_i64().expect("year"))
        .collect();
    assert_eq!(years, vec![2000, 1950, 1900]);

    // Every term must match
    let response = client
        .get(format!("{}/books?search=gamma {}", BASE_URL, tag))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["author"]["id"], author_id);

    // Authors list carries books sorted by title
    let response = client
        .get(format!("{}/authors?search={}", BASE_URL, tag))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"][0]["books_count"], 3);
    assert_eq!(body["items"][0]["books"][0]["title"], format!("Alpha {}", tag));
}

#[tokio::test]
#[ignore]
async fn test_cover_upload_and_detach() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique();

    let author = create_author(&client, &token, &format!("Cover{}", tag)).await;
    let author_id = author["id"].as_i64().expect("No author ID");
    let response = create_book(&client, &token, author_id, "Illustrated", 2001).await;
    let book: Value = response.json().await.expect("Failed to parse response");
    assert!(book["cover"].is_null());
    let book_id = book["id"].as_i64().expect("No book ID");

    let part = multipart::Part::bytes(PNG.to_vec())
        .file_name("cover.html")
        .mime_str("image/png")
        .expect("mime");
    let response = client
        .put(format!("{}/books/{}/cover", BASE_URL, book_id))
        .bearer_auth(&token)
        .multipart(multipart::Form::new().part("cover", part))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let cover = body["cover"].as_str().expect("cover url");
    assert!(cover.contains("covers/"));
    // Stored under the detected format, whatever the client called it
    assert!(cover.ends_with(".png"));
    assert!(!cover.contains(".html"));

    let response = client
        .delete(format!("{}/books/{}/cover", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["cover"].is_null());
}
