//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, dashboard, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Catalog, loan and renewal REST API for a lending library"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home page
        dashboard::index,
        // Accounts
        auth::login,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::renewal_form,
        loans::renew_book,
    ),
    components(
        schemas(
            // Accounts
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Catalog
            crate::models::BookShort,
            crate::models::BookDetail,
            crate::models::BookForm,
            crate::models::Author,
            crate::models::AuthorDetail,
            crate::models::AuthorForm,
            crate::models::Genre,
            crate::models::Language,
            crate::models::BookInstance,
            crate::models::LoanStatus,
            crate::models::Permission,
            // Loans
            crate::models::forms::RenewBookForm,
            crate::models::forms::RenewBookFormView,
            crate::services::loans::RenewalPage,
            // Home page
            crate::services::dashboard::DashboardCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Home page counts"),
        (name = "accounts", description = "Login sessions"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Authors"),
        (name = "loans", description = "Loaned copies and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
