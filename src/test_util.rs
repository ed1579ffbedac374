//! Shared fixtures for unit and handler tests

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    api,
    config::AppConfig,
    models::{BookDetail, BookInstance, LoanStatus, Permission, SessionClaims},
    repository::{
        MockAuthorsRepository, MockBooksRepository, MockInstancesRepository,
        MockTaxonomyRepository, MockUsersRepository, Repository,
    },
    services::{session::MockSessionStore, Services},
    AppState,
};

pub const TEST_SID: &str = "test-session";

/// One mock per repository trait
#[derive(Default)]
pub struct MockRepository {
    pub books: MockBooksRepository,
    pub authors: MockAuthorsRepository,
    pub instances: MockInstancesRepository,
    pub taxonomy: MockTaxonomyRepository,
    pub users: MockUsersRepository,
}

impl MockRepository {
    pub fn build(self) -> Repository {
        Repository {
            books: Arc::new(self.books),
            authors: Arc::new(self.authors),
            instances: Arc::new(self.instances),
            taxonomy: Arc::new(self.taxonomy),
            users: Arc::new(self.users),
        }
    }
}

pub fn sample_book(id: i32) -> BookDetail {
    BookDetail {
        id,
        title: "Ion".to_string(),
        summary: "A novel.".to_string(),
        isbn: "9789734614560".to_string(),
        author: None,
        genres: vec![],
        language: None,
        instances: vec![],
    }
}

pub fn sample_instance(id: Uuid, due_back: Option<&str>) -> BookInstance {
    BookInstance {
        id,
        book_id: 1,
        book_title: "Ion".to_string(),
        imprint: "Minerva, 1920".to_string(),
        due_back: due_back.map(|d| d.parse().unwrap()),
        status: LoanStatus::OnLoan,
        borrower_id: Some(7),
        borrower_username: Some("reader".to_string()),
        is_overdue: false,
    }
}

/// Argon2 hash of `password`, as stored in `users.password`
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// Router over mocked repositories and sessions
pub struct TestApp {
    pub repo: MockRepository,
    pub sessions: MockSessionStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            repo: MockRepository::default(),
            sessions: MockSessionStore::new(),
        }
    }

    /// Accept the session of tokens issued by [`token`] for `user_id`
    pub fn logged_in(mut self, user_id: i32) -> Self {
        self.sessions
            .expect_user_id()
            .returning(move |_| Ok(Some(user_id)));
        self
    }

    pub fn router(self) -> Router {
        let config = AppConfig::default();
        let services = Services::new(self.repo.build(), Arc::new(self.sessions), &config);
        api::create_router(AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}

/// Signed session token for `user_id` with the given permissions
pub fn token(user_id: i32, permissions: &[Permission]) -> String {
    let now = Utc::now().timestamp();
    SessionClaims {
        sub: format!("user{}", user_id),
        user_id,
        sid: TEST_SID.to_string(),
        is_superuser: false,
        permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
        exp: now + 3600,
        iat: now,
    }
    .create_token(&AppConfig::default().auth.jwt_secret)
    .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    request(method, uri, token).body(Body::empty()).unwrap()
}

/// Send a request and decode the (possibly empty) JSON body
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub fn location(headers: &HeaderMap) -> &str {
    headers[header::LOCATION].to_str().unwrap()
}
