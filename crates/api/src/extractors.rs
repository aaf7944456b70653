//! Request extractors.

use std::str::FromStr;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use ledgerline_core::context::{ActorContext, ActorRole};
use ledgerline_shared::AppError;
use ledgerline_shared::types::{OrganizationId, UserId};
use serde_json::json;
use uuid::Uuid;

/// Header carrying the organization scope.
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
/// Header carrying the acting user's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the acting user's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extracts the actor context from request headers.
///
/// Identity is asserted by the caller; verifying it is the deployment's
/// concern (gateway, mTLS), not this service's. Missing or malformed
/// headers reject with 401.
#[derive(Debug, Clone)]
pub struct Actor(pub ActorContext);

fn unauthorized(message: &str) -> Response {
    let err = AppError::Unauthorized(message.to_string());
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organization_id = header_str(parts, ORGANIZATION_ID_HEADER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| {
                unauthorized("x-organization-id header with a valid UUID is required")
            })?;

        let actor_id = header_str(parts, ACTOR_ID_HEADER)
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| unauthorized("x-actor-id header with a valid UUID is required"))?;

        let role = header_str(parts, ACTOR_ROLE_HEADER)
            .and_then(|v| ActorRole::from_str(v).ok())
            .ok_or_else(|| {
                unauthorized(
                    "x-actor-role header is required: super_admin, admin, moderator, author, reader",
                )
            })?;

        Ok(Self(ActorContext::new(
            OrganizationId::from_uuid(organization_id),
            UserId::from_uuid(actor_id),
            role,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/accounts");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_extracts_full_context() {
        let org = Uuid::now_v7();
        let user = Uuid::now_v7();
        let mut parts = parts_with_headers(&[
            (ORGANIZATION_ID_HEADER, &org.to_string()),
            (ACTOR_ID_HEADER, &user.to_string()),
            (ACTOR_ROLE_HEADER, "admin"),
        ]);

        let Actor(ctx) = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.organization_id.into_inner(), org);
        assert_eq!(ctx.actor_id.into_inner(), user);
        assert_eq!(ctx.role, ActorRole::Admin);
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let mut parts = parts_with_headers(&[]);
        assert!(Actor::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let mut parts = parts_with_headers(&[
            (ORGANIZATION_ID_HEADER, &Uuid::now_v7().to_string()),
            (ACTOR_ID_HEADER, &Uuid::now_v7().to_string()),
            (ACTOR_ROLE_HEADER, "owner"),
        ]);
        assert!(Actor::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_uuid_rejected() {
        let mut parts = parts_with_headers(&[
            (ORGANIZATION_ID_HEADER, "not-a-uuid"),
            (ACTOR_ID_HEADER, &Uuid::now_v7().to_string()),
            (ACTOR_ROLE_HEADER, "reader"),
        ]);
        assert!(Actor::from_request_parts(&mut parts, &()).await.is_err());
    }
}
