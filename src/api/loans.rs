//! Loaned books and renewal endpoints

use axum::{
    extract::{FromRequest, Request, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Local;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{forms::RenewBookForm, BookInstance, PageQuery, Permission},
    services::loans::{RenewalOutcome, RenewalPage},
};

use super::{AuthenticatedUser, PageNumber, PaginatedResponse, RecordId, API_PREFIX};

/// Copies on loan to the current user
const MY_LOANS_PER_PAGE: i64 = 3;
/// Copies on loan to anyone
const ALL_LOANS_PER_PAGE: i64 = 5;

/// Books on loan to the current user, earliest due first
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans", body = PaginatedResponse<BookInstance>),
        (status = 303, description = "Login required"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    PageNumber(page): PageNumber,
) -> AppResult<Json<PaginatedResponse<BookInstance>>> {
    let page = state
        .services
        .loans
        .list_on_loan(Some(claims.user_id), page, MY_LOANS_PER_PAGE)
        .await?;
    Ok(Json(page.into()))
}

/// Every book on loan, with its borrower
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All loans", body = PaginatedResponse<BookInstance>),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    PageNumber(page): PageNumber,
) -> AppResult<Json<PaginatedResponse<BookInstance>>> {
    claims.require(Permission::CanMarkReturned)?;

    let page = state
        .services
        .loans
        .list_on_loan(None, page, ALL_LOANS_PER_PAGE)
        .await?;
    Ok(Json(page.into()))
}

/// Renewal form for a copy, pre-filled with the proposed date
#[utoipa::path(
    get,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Unbound renewal form", body = RenewalPage),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<Uuid>,
) -> AppResult<Json<RenewalPage>> {
    claims.require(Permission::CanMarkReturned)?;

    let page = state
        .services
        .loans
        .renewal_form(id, Local::now().date_naive())
        .await?;
    Ok(Json(page))
}

/// Submit a renewal date for a copy
///
/// A valid date is written and the client is sent to the list of all
/// loans. An invalid one returns the form with its errors and changes
/// nothing.
#[utoipa::path(
    post,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Renewed; redirects to all loans"),
        (status = 200, description = "Rejected form with field errors", body = RenewalPage),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    RecordId(id): RecordId<Uuid>,
    request: Request,
) -> AppResult<Response> {
    claims.require(Permission::CanMarkReturned)?;

    // A body that is not a form submits no date
    let form = Form::<RenewBookForm>::from_request(request, &state)
        .await
        .map(|Form(form)| form)
        .unwrap_or_default();

    let outcome = state
        .services
        .loans
        .renew(id, form, Local::now().date_naive())
        .await?;

    Ok(match outcome {
        RenewalOutcome::Renewed(_) => {
            Redirect::to(&format!("{}/borrowed", API_PREFIX)).into_response()
        }
        RenewalOutcome::Rejected(page) => Json(page).into_response(),
    })
}
