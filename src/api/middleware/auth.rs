use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{api::state::AppState, domain::Role, error::AppError};

#[derive(Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// A missing header, a malformed or expired token, and a non-admin role all
/// produce the same 401; callers learn nothing about which check failed.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_token(&request)
        .and_then(|token| state.tokens.verify(token))
        .ok_or(AppError::Unauthorized)?;

    if claims.role != Role::Admin {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(CurrentUser {
        user_id: claims.user_id,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
