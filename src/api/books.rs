//! Book (catalog) endpoints

use axum::{
    extract::{Request, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{BookDetail, BookForm, BookShort, PageQuery},
};

use super::{resources::BOOKS, AuthenticatedUser, PageNumber, PaginatedResponse, RecordId};

/// List books, five per page
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = PaginatedResponse<BookShort>),
        (status = 303, description = "Login required"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PageNumber(page): PageNumber,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let page = state
        .services
        .catalog
        .list_books(page, BOOKS.paginate_by)
        .await?;
    Ok(Json(page.into()))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/book/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details with its copies", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/book/create",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 303, description = "Created; redirects to the new book"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing catalog.add_book"),
        (status = 409, description = "ISBN already used")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    request: Request,
) -> AppResult<Redirect> {
    claims.require(BOOKS.add)?;

    let form: BookForm = BOOKS.read_form(request, &state).await?;
    let id = state.services.catalog.create_book(form).await?;
    Ok(BOOKS.redirect_to_detail(id))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/book/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 303, description = "Updated; redirects to the book list"),
        (status = 400, description = "Invalid form or unknown field", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing catalog.change_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
    request: Request,
) -> AppResult<Redirect> {
    claims.require(BOOKS.change)?;

    let form: BookForm = BOOKS.read_form(request, &state).await?;
    state.services.catalog.update_book(id, form).await?;
    Ok(BOOKS.redirect_to_list())
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/book/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirects to the book list"),
        (status = 403, description = "Missing catalog.delete_book"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
) -> AppResult<Redirect> {
    claims.require(BOOKS.delete)?;

    state.services.catalog.delete_book(id).await?;
    Ok(BOOKS.redirect_to_list())
}
