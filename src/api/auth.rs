//! Account endpoints: login, logout and the current user

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::SessionClaims};

use super::{AuthenticatedUser, SESSION_COOKIE};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Session token, also set as the `sessionid` cookie
    pub token: String,
    pub token_type: String,
    /// Seconds until the session expires
    pub expires_in: i64,
    pub user: UserInfo,
}

/// The logged-in user as seen by the API
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
    /// Granted permissions, e.g. `catalog.can_mark_returned`
    pub permissions: Vec<String>,
}

impl From<&SessionClaims> for UserInfo {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.sub.clone(),
            is_superuser: claims.is_superuser,
            permissions: claims.permissions.clone(),
        }
    }
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/accounts/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let session = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/");

    let response = LoginResponse {
        token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.claims.exp - session.claims.iat,
        user: UserInfo::from(&session.claims),
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Close the current session
#[utoipa::path(
    post,
    path = "/accounts/logout",
    tag = "accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 303, description = "Login required")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    state.services.auth.logout(&claims).await?;

    // Expire the cookie whether or not this request carried it
    let mut removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    removal.make_removal();

    Ok((jar.add(removal), StatusCode::NO_CONTENT))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/accounts/me",
    tag = "accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 303, description = "Login required")
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<UserInfo> {
    Json(UserInfo::from(&claims))
}
