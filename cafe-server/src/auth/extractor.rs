//! CurrentUser extractor
//!
//! Lets handlers take `user: CurrentUser` directly. The user is put into the
//! request extensions by [`super::require_auth`]; a handler mounted outside
//! the authenticated tree gets a 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::security_log;

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                AppError::not_authenticated()
            })
    }
}
