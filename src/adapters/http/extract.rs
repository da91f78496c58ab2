//! Caller identity.
//!
//! The API does not validate credentials. The calling user is taken from the
//! `X-User-Id` header, which a gateway in front of the service is expected
//! to set after authenticating the request.

use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::domain::foundation::UserId;

use super::error::ErrorResponse;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user context extracted from the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { user_from_parts(parts).ok_or(AuthenticationRequired) })
    }
}

fn user_from_parts(parts: &Parts) -> Option<AuthenticatedUser> {
    let user_id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<UserId>().ok())?;
    Some(AuthenticatedUser { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/platform-courses");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn reads_user_from_header() {
        let user = UserId::new();
        let mut parts = parts(Some(&user.to_string()));
        let extracted = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(extracted.user_id, user);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let mut parts = parts(None);
        let rejection = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        let mut parts = parts(Some("not-a-uuid"));
        assert!(AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }
}
