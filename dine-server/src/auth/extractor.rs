//! JWT Extractors
//!
//! [`CurrentUser`] requires a valid bearer token. [`Actor`] accepts requests
//! without one as anonymous, but still rejects a token that fails to verify.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{Actor, CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Verify a raw token into the member it was issued for
pub fn authenticate(jwt: &JwtService, token: &str, uri: &str) -> Result<CurrentUser, AppError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        security_log!("WARN", "auth_failed", error = format!("{}", e), uri = uri);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;
    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))
}

fn bearer(parts: &Parts) -> Option<Result<&str, AppError>> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|header| {
            JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
        })
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        let token = match bearer(parts) {
            Some(token) => token?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::not_authenticated());
            }
        };

        let user = authenticate(state.jwt(), token, &parts.uri.to_string())?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if bearer(parts).is_none() {
            return Ok(Actor::Anonymous);
        }
        CurrentUser::from_request_parts(parts, state)
            .await
            .map(Actor::Member)
    }
}
