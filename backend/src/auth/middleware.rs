//! Request authentication and the role gate
//!
//! `Identity` is the extractor for mandatory-auth routes: it verifies the
//! bearer token with the pre-computed keys in `AppState` and attaches the
//! claims to the handler. `OptionalIdentity` is the lenient variant used by
//! routes that serve both anonymous and signed-in callers. `authorize` is
//! the pure per-request role decision.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use smart_school_shared::roles::Role;
use uuid::Uuid;

/// Authenticated principal extracted from a verified access token
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
}

impl Identity {
    /// Role gate: may this principal proceed into a route that allows
    /// exactly `allowed` roles?
    pub fn authorize(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Role gate over a possibly-absent identity
///
/// Pure and stateless: no identity on a mandatory-auth route is
/// `Unauthenticated`, a present identity outside the allowed set is
/// `Forbidden`.
pub fn authorize(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), ApiError> {
    match identity {
        Some(identity) => identity.authorize(allowed),
        None => Err(ApiError::Unauthenticated),
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Absent header and non-Bearer schemes both count as "no credential
        // presented".
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;

        let claims = app_state.jwt().verify_access_token(token)?;
        let id = claims.principal_id().map_err(|_| ApiError::InvalidToken)?;

        Ok(Identity {
            id,
            role: claims.role,
            email: claims.email,
        })
    }
}

/// Optional-auth extractor
///
/// No credential or an invalid one both yield `None`: the request proceeds
/// unauthenticated instead of being rejected.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for OptionalIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await.ok();
        Ok(OptionalIdentity(identity))
    }
}
