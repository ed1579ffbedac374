//! API integration tests
//!
//! Run against a live server with a superuser `admin` / `admin`, a reader
//! account `reader` / `reader`, and at least one copy on loan.

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Client that reports redirects instead of following them
fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

async fn get_auth_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let response = client()
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().get("set-cookie").is_some());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let response = client()
        .post(format!("{}/accounts/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_anonymous_request_redirects_to_login() {
    let response = client()
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/api/v1/accounts/login?next="));
}

#[tokio::test]
#[ignore]
async fn test_home_page_counts_visits() {
    let client = client();
    let token = get_auth_token(&client, "admin", "admin").await;

    let mut visits = Vec::new();
    for _ in 0..3 {
        let body: Value = client
            .get(format!("{}/", BASE_URL))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert!(body["num_books"].is_number());
        visits.push(body["num_visits"].as_i64().unwrap());
    }

    assert_eq!(visits, vec![0, 1, 2]);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = client();
    let token = get_auth_token(&client, "admin", "admin").await;

    let response = client
        .post(format!("{}/book/create", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Integration Test Book",
            "summary": "Created by the integration tests.",
            "isbn": "9990000000001"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()["location"].to_str().unwrap().to_string();
    let id = location.rsplit('/').next().unwrap().to_string();

    let response = client
        .get(format!("http://localhost:8080{}", location))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Integration Test Book");

    let response = client
        .put(format!("{}/book/{}/update", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Integration Test Book",
            "summary": "Created by the integration tests.",
            "isbn": "9990000000001",
            "id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(format!("{}/book/{}/delete", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/api/v1/books");
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_list_all_loans() {
    let client = client();
    let token = get_auth_token(&client, "reader", "reader").await;

    let response = client
        .get(format!("{}/borrowed", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/mybooks", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_renewal_of_first_loan() {
    let client = client();
    let token = get_auth_token(&client, "admin", "admin").await;

    let body: Value = client
        .get(format!("{}/borrowed", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let id = body["items"][0]["id"].as_str().expect("No loans to renew").to_string();

    let form: Value = client
        .get(format!("{}/book/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let proposed = form["form"]["renewal_date"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .form(&[("renewal_date", "1999-01-01")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let rejected: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        rejected["form"]["errors"]["renewal_date"][0],
        "Invalid date - renewal in past"
    );

    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, id))
        .bearer_auth(&token)
        .form(&[("renewal_date", proposed.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/api/v1/borrowed");
}

#[tokio::test]
#[ignore]
async fn test_logout_closes_session() {
    let client = client();
    let token = get_auth_token(&client, "admin", "admin").await;

    let response = client
        .post(format!("{}/accounts/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/accounts/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
