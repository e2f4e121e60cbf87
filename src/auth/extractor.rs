use crate::api::AppState;
use crate::auth::JwtService;
use crate::core::Actor;
use crate::errors::Error;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

/// Protected handlers take an `Actor` argument; requests without a valid bearer token never
/// reach them.
impl FromRequestParts<AppState> for Actor {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Self>() {
            return Ok(actor.clone());
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Unauthorized {
                message: "Missing bearer token".to_string(),
            })?;

        let token = JwtService::extract_from_header(header).ok_or_else(|| Error::Unauthorized {
            message: "Malformed authorization header".to_string(),
        })?;

        let claims = state.jwt.validate_token(token).inspect_err(|e| {
            warn!(uri = %parts.uri, error = %e, "Rejected bearer token");
        })?;
        let actor = Self::try_from(claims)?;

        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}
