use crate::{AppState, api::models::users::CurrentUser, auth::session, errors::Error};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::trace;

/// Extract the session cookie from request parts and verify it.
///
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid session found and verified
/// - Some(Err(error)): Cookie header present but unreadable
fn try_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser, Error>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == config.session_cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    // Expired/invalid tokens are expected; keep scanning other cookies
                    Err(_) => continue,
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        match try_session_auth(parts, &state.config) {
            Some(Ok(user)) => Ok(user),
            Some(Err(e)) => Err(e),
            None => {
                trace!("No session credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::session::create_session_token;
    use axum::extract::FromRequestParts as _;
    use uuid::Uuid;

    fn test_state() -> AppState {
        crate::test_utils::state_without_db()
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_valid_session_cookie() {
        let state = test_state();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Admin,
            employee_id: None,
        };
        let token = create_session_token(&user, &state.config).unwrap();
        let mut parts = parts_with_cookie(&format!("{}={token}", state.config.session_cookie_name));

        let extracted = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthorized() {
        let state = test_state();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap_err().status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_cookie(&format!("{}=garbage.token.value", state.config.session_cookie_name));

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap_err().status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
