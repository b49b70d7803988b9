//! Bearer token authentication
//!
//! Access tokens are verified by the configured `TokenIssuer`; the decoded
//! `Actor` travels to handlers through request extensions.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};

use farmlink::{Actor, TokenKind};

use crate::AppState;

/// Authenticated caller, set by [`require_auth`] or [`optional_auth`]
pub struct CurrentActor(pub Actor);

/// Caller when known; public routes accept anonymous requests
pub struct MaybeActor(pub Option<Actor>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(CurrentActor)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(parts.extensions.get::<Actor>().cloned()))
    }
}

fn bearer_token(request: &Request) -> Option<Result<&str, StatusCode>> {
    let value = request.headers().get(header::AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED),
    )
}

fn decode(state: &AppState, token: &str) -> Result<Actor, StatusCode> {
    match state.token_issuer.verify(token) {
        Ok(claims) if claims.kind == TokenKind::Access => Ok(claims.actor()),
        Ok(_) => {
            tracing::warn!("Refresh token used as access token");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(e) => {
            tracing::warn!("Rejected access token: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Reject requests without a valid access token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = match bearer_token(&request) {
        Some(token) => token?,
        None => {
            tracing::warn!("Missing Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };
    let actor = decode(&state, token)?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Attach the caller when a token is sent; a bad token is still rejected
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = match bearer_token(&request) {
        Some(token) => Some(decode(&state, token?)?),
        None => None,
    };
    if let Some(actor) = actor {
        request.extensions_mut().insert(actor);
    }
    Ok(next.run(request).await)
}
