//! Author endpoints

use axum::{
    extract::{Request, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{Author, AuthorDetail, AuthorForm, PageQuery},
};

use super::{resources::AUTHORS, AuthenticatedUser, PageNumber, PaginatedResponse, RecordId};

/// List authors, three per page
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = PaginatedResponse<Author>),
        (status = 303, description = "Login required"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    PageNumber(page): PageNumber,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let page = state
        .services
        .catalog
        .list_authors(page, AUTHORS.paginate_by)
        .await?;
    Ok(Json(page.into()))
}

/// Get an author and their books
#[utoipa::path(
    get,
    path = "/author/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/author/create",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Created; redirects to the new author"),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing catalog.add_author")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    request: Request,
) -> AppResult<Redirect> {
    claims.require(AUTHORS.add)?;

    let form: AuthorForm = AUTHORS.read_form(request, &state).await?;
    let id = state.services.catalog.create_author(form).await?;
    Ok(AUTHORS.redirect_to_detail(id))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/author/{id}/update",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Updated; redirects to the author list"),
        (status = 400, description = "Invalid form or unknown field", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing catalog.change_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
    request: Request,
) -> AppResult<Redirect> {
    claims.require(AUTHORS.change)?;

    let form: AuthorForm = AUTHORS.read_form(request, &state).await?;
    state.services.catalog.update_author(id, form).await?;
    Ok(AUTHORS.redirect_to_list())
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/author/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirects to the author list"),
        (status = 403, description = "Missing catalog.delete_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<i32>,
) -> AppResult<Redirect> {
    claims.require(AUTHORS.delete)?;

    state.services.catalog.delete_author(id).await?;
    Ok(AUTHORS.redirect_to_list())
}
