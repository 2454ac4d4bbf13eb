use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use std::collections::HashMap;

use crate::AppState;
use crate::error::AppError;

/// Identity resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// Static bearer-token registry. Callers branch on presence; there is no
/// exception-driven control flow around identity.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<String, String>,
}

impl ApiKeys {
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    /// Resolves the logged-in user from an `Authorization` header value,
    /// `None` when the header is missing, malformed, or unrecognized.
    pub fn logged_in_user(&self, auth_header: Option<&str>) -> Option<AuthenticatedUser> {
        let token = auth_header?.strip_prefix("Bearer ")?.trim();
        self.keys.get(token).map(|email| AuthenticatedUser {
            email: email.clone(),
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        state
            .api_keys
            .logged_in_user(auth_header)
            .ok_or_else(|| AppError::Unauthorized("User not authorized".to_string()))
    }
}
