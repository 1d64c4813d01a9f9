//! Request guards. `require_auth` verifies the bearer access token and
//! injects the decoded `Principal`; write handlers on the management routes
//! call `ensure_admin` on top of it.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use models::enums::UserRole;
use service::auth::domain::Principal;

use crate::errors::ApiError;
use crate::state::AppState;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthorized)?;
    let claims = state.auth.tokens().verify_access(token).map_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "access token rejected");
        ApiError::unauthorized()
    })?;
    req.extensions_mut().insert(claims.principal());
    Ok(next.run(req).await)
}

/// Role check for the management endpoints; assumes `require_auth` already
/// populated the `Principal`.
pub fn ensure_admin(principal: &Principal) -> Result<(), ApiError> {
    if !matches!(principal.role, UserRole::SuperAdmin | UserRole::Admin) {
        warn!(user_id = %principal.user_id, role = ?principal.role, "role check failed");
        return Err(ApiError::forbidden());
    }
    Ok(())
}
