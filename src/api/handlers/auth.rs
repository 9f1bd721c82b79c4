//! Session endpoints: login, logout, whoami.

use crate::api::models::users::{CurrentUser, LoginRequest, LoginResponse};
use crate::auth::{password, session};
use crate::db::handlers::Users;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};

fn session_cookie(state: &AppState, value: &str, max_age_secs: i64) -> Result<HeaderValue> {
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        state.config.session_cookie_name, value, max_age_secs
    );
    cookie.parse().map_err(|e| Error::Internal {
        operation: format!("build session cookie: {e}"),
    })
}

#[utoipa::path(
    post,
    path = "/authentication/login",
    tag = "auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Response> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_email(&request.email).await?.ok_or(Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;

    let hash = user.password_hash.as_deref().ok_or(Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;
    if !password::verify_string(&request.password, hash)? {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        employee_id: user.employee_id,
    };

    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = session_cookie(&state, &token, state.config.jwt_expiry_secs as i64)?;

    let body = serde_json::to_string(&LoginResponse { user: current_user }).map_err(|e| Error::Internal {
        operation: format!("serialize login response: {e}"),
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::SET_COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .map_err(|e| Error::Internal {
            operation: format!("build login response: {e}"),
        })
}

#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "auth",
    summary = "Log out",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    let cookie = session_cookie(&state, "", 0)?;
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::SET_COOKIE, cookie)
        .body(axum::body::Body::empty())
        .map_err(|e| Error::Internal {
            operation: format!("build logout response: {e}"),
        })
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    summary = "Current user",
    responses(
        (status = 200, description = "The authenticated user", body = CurrentUser),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}
