use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRef, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use tracing::warn;

use crate::auth::dto::TargetUserRequest;
use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::{Role, User};
use crate::auth::service::user_by_user_id;
use crate::state::AppState;

const BEARER_SCHEMA: &str = "Bearer ";

// Protected bodies are small JSON documents; anything past this is not a
// request we serve.
const BODY_LIMIT: usize = 1024 * 1024;

/// State handed to the authorization middleware: the app state plus the
/// roles a route admits for non-admin targets.
#[derive(Clone)]
pub struct GateConfig {
    pub state: AppState,
    pub allowed: Arc<[Role]>,
}

impl GateConfig {
    pub fn new(state: AppState, allowed: &[Role]) -> Self {
        Self {
            state,
            allowed: Arc::from(allowed),
        }
    }
}

/// Subject and target ids resolved by the gate, available to downstream
/// handlers through request extensions.
#[derive(Debug, Clone, Copy)]
pub struct AuthzContext {
    pub subject_id: i64,
    pub target_id: i64,
}

/// Authorization middleware for role-gated routes.
///
/// Verifies the bearer token, peeks the target user id out of the body
/// without consuming it for the handler, then re-resolves both the token
/// subject and the target from the store. The role embedded in the token
/// is ignored; only the freshly read target role decides. The two reads
/// are sequential and non-transactional.
pub async fn authorize(
    State(gate): State<GateConfig>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;

    let keys = JwtKeys::from_ref(&gate.state);
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "token verification failed");
        AuthError::Unauthenticated
    })?;

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| AuthError::InvalidRequest)?;
    let target_id = peek_target_id(&bytes)?;

    let subject = user_by_user_id(&gate.state.db, claims.user_id)
        .await
        .map_err(reject_principal)?;
    let target = user_by_user_id(&gate.state.db, target_id)
        .await
        .map_err(reject_principal)?;

    check_access(&subject, &target, &gate.allowed)?;

    // Hand the handler the same bytes we peeked at; nothing is re-serialized.
    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(AuthzContext {
        subject_id: subject.id,
        target_id: target.id,
    });
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthenticated)?;

    let token = header
        .strip_prefix(BEARER_SCHEMA)
        .ok_or(AuthError::Unauthenticated)?;

    if token.is_empty() {
        return Err(AuthError::Unauthenticated);
    }
    Ok(token)
}

/// Extracts the target user id from the buffered body. The bytes are left
/// untouched for the downstream handler.
fn peek_target_id(bytes: &Bytes) -> Result<i64, AuthError> {
    let req: TargetUserRequest =
        serde_json::from_slice(bytes).map_err(|_| AuthError::InvalidRequest)?;
    if req.user_id == 0 {
        return Err(AuthError::InvalidRequest);
    }
    Ok(req.user_id)
}

/// A failed subject or target resolution reads as one generic rejection;
/// the distinct cause (not found, soft-deleted, unmapped role) stays in the
/// server log. Store failures keep their own classification.
fn reject_principal(err: AuthError) -> AuthError {
    match err {
        AuthError::Store(e) => AuthError::Store(e),
        other => {
            warn!(cause = ?other, "principal resolution failed");
            AuthError::InvalidAuthorization
        }
    }
}

/// The access decision. An admin target is allowed unconditionally;
/// everyone else needs an allow-listed target role and may only act on
/// themselves.
fn check_access(subject: &User, target: &User, allowed: &[Role]) -> Result<(), AuthError> {
    if target.role() == Role::Admin {
        return Ok(());
    }
    if !allowed.contains(&target.role()) || subject.id != target.id {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn make_user(id: i64, role: &str) -> User {
        User {
            id,
            full_name: "Jane Doe".into(),
            passhash: "hash".into(),
            phone: format!("+1555{id}"),
            email: format!("user{id}@x.com"),
            user_role: role.into(),
            deleted: false,
        }
    }

    const ALLOWED: &[Role] = &[Role::JobSeeker, Role::Admin];

    #[test]
    fn admin_target_is_always_allowed() {
        let subject = make_user(1, "jobseeker");
        let target = make_user(2, "admin");
        assert!(check_access(&subject, &target, ALLOWED).is_ok());
        // even with an empty allow-list
        assert!(check_access(&subject, &target, &[]).is_ok());
    }

    #[test]
    fn self_with_allowed_role_is_allowed() {
        let subject = make_user(5, "jobseeker");
        let target = make_user(5, "jobseeker");
        assert!(check_access(&subject, &target, ALLOWED).is_ok());
    }

    #[test]
    fn disallowed_role_is_rejected_even_for_self() {
        let subject = make_user(5, "employer");
        let target = make_user(5, "employer");
        assert!(matches!(
            check_access(&subject, &target, ALLOWED),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn allowed_role_on_another_user_is_rejected() {
        let subject = make_user(5, "jobseeker");
        let target = make_user(6, "jobseeker");
        assert!(matches!(
            check_access(&subject, &target, ALLOWED),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn peek_target_id_reads_without_consuming() {
        let bytes = Bytes::from_static(br#"{"user_id":42,"new_full_name":"Jane"}"#);
        assert_eq!(peek_target_id(&bytes).unwrap(), 42);
        // the buffer is untouched and still fully readable
        assert_eq!(&bytes[..], br#"{"user_id":42,"new_full_name":"Jane"}"#);
    }

    #[test]
    fn peek_target_id_rejects_missing_or_zero_id() {
        assert!(matches!(
            peek_target_id(&Bytes::from_static(b"{}")),
            Err(AuthError::InvalidRequest)
        ));
        assert!(matches!(
            peek_target_id(&Bytes::from_static(br#"{"user_id":0}"#)),
            Err(AuthError::InvalidRequest)
        ));
        assert!(matches!(
            peek_target_id(&Bytes::from_static(b"not json")),
            Err(AuthError::InvalidRequest)
        ));
    }

    #[test]
    fn principal_rejection_is_generic_but_keeps_store_errors() {
        assert!(matches!(
            reject_principal(AuthError::UserNotFound),
            AuthError::InvalidAuthorization
        ));
        assert!(matches!(
            reject_principal(AuthError::WrongUserRole),
            AuthError::InvalidAuthorization
        ));
        assert!(matches!(
            reject_principal(AuthError::Store(sqlx::Error::PoolTimedOut)),
            AuthError::Store(_)
        ));
    }
}
