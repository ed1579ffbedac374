//! API handlers for the Local Library REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod dashboard;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod resources;

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri, Path, Query},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use axum_extra::extract::CookieJar;
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{Page, PageQuery, SessionClaims},
    AppState,
};

pub const API_PREFIX: &str = "/api/v1";

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "sessionid";

/// Extractor for the logged-in user.
///
/// The token comes from a `Bearer` header or the session cookie, and is only
/// accepted while its server-side session is open. Anything else sends the
/// client to the login page with the requested path as `next`.
pub struct AuthenticatedUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(token) = session_token(parts) {
            if let Some(claims) = state.services.auth.authenticate(&token).await? {
                return Ok(AuthenticatedUser(claims));
            }
        }

        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let next = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        Err(AppError::LoginRequired {
            login_url: state.config.auth.login_url.clone(),
            next,
        })
    }
}

fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Record key taken from the path.
///
/// A key that does not parse names no record, so it is rejected as not found
/// rather than as a bad request.
pub struct RecordId<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for RecordId<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| RecordId(id))
            .map_err(|rejection| AppError::NotFound(rejection.body_text()))
    }
}

/// Requested page number from `?page=N`; a non-integer page is not found
pub struct PageNumber(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for PageNumber
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map(|Query(query)| PageNumber(query.page))
            .map_err(|_| {
                AppError::NotFound("Invalid page: that page number is not an integer".to_string())
            })
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Rows of the current page
    pub items: Vec<T>,
    /// Total number of rows
    pub total: i64,
    /// Current page number (1-based)
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    /// Number of pages
    pub num_pages: i64,
}

impl<T> From<Page<T>> for PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: page.request.page,
            per_page: page.request.per_page,
            num_pages: page.request.num_pages,
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home page
        .route("/", get(dashboard::index))
        // Accounts
        .route("/accounts/login", post(auth::login))
        .route("/accounts/logout", post(auth::logout))
        .route("/accounts/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books))
        .route("/book/create", post(books::create_book))
        .route("/book/:id", get(books::get_book))
        .route("/book/:id/update", put(books::update_book))
        .route("/book/:id/delete", delete(books::delete_book))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route("/author/create", post(authors::create_author))
        .route("/author/:id", get(authors::get_author))
        .route("/author/:id/update", put(authors::update_author))
        .route("/author/:id/delete", delete(authors::delete_author))
        // Loans
        .route("/mybooks", get(loans::my_loans))
        .route("/borrowed", get(loans::all_loans))
        .route(
            "/book/:id/renew",
            get(loans::renewal_form).post(loans::renew_book),
        );

    Router::new()
        .nest(API_PREFIX, api_v1)
        // Home page with a trailing slash
        .route("/api/v1/", get(dashboard::index))
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
